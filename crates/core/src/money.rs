/// Render an amount of integer cents as `"$D.CC"`, with cents zero-padded to
/// two digits and a leading `-` for negative amounts.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{sign}${}.{:02}", magnitude / 100, magnitude % 100)
}
