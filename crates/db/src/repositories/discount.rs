use chrono::{DateTime, Utc};
use sqlx::Row;

use storefront_core::domain::discount::{
    DiscountCode, DiscountDraft, DiscountKind, DiscountPatch, Expiration,
};

use super::{DiscountRepository, RepositoryError};
use crate::DbPool;

/// Sentinel stored in `expires_at` for codes that never expire.
const NEVER_EXPIRES: &str = "never";

pub struct SqlDiscountRepository {
    pool: DbPool,
}

impl SqlDiscountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn expiration_as_column(expiration: &Expiration) -> String {
    match expiration {
        Expiration::Never => NEVER_EXPIRES.to_string(),
        Expiration::At(when) => when.to_rfc3339(),
    }
}

fn parse_expiration(raw: Option<String>) -> Result<Expiration, RepositoryError> {
    match raw.as_deref() {
        None | Some(NEVER_EXPIRES) => Ok(Expiration::Never),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|when| Expiration::At(when.with_timezone(&Utc)))
            .map_err(|e| RepositoryError::Decode(format!("bad expires_at `{value}`: {e}"))),
    }
}

fn kind_as_columns(kind: &DiscountKind) -> (Option<i64>, Option<i64>, Option<bool>) {
    match kind {
        DiscountKind::Percentage(percentage) => (Some(*percentage), None, None),
        DiscountKind::AmountOff(amount_cents) => (None, Some(*amount_cents), None),
        DiscountKind::FreeShipping => (None, None, Some(true)),
    }
}

fn row_to_discount(row: &sqlx::sqlite::SqliteRow) -> Result<DiscountCode, RepositoryError> {
    let code: String = row.try_get("code").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let percentage: Option<i64> =
        row.try_get("percentage").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let amount_cents: Option<i64> =
        row.try_get("amount_cents").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let free_shipping: Option<bool> =
        row.try_get("free_shipping").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let expires_at: Option<String> =
        row.try_get("expires_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let kind = match (percentage, amount_cents, free_shipping) {
        (Some(percentage), None, None) => DiscountKind::Percentage(percentage),
        (None, Some(amount_cents), None) => DiscountKind::AmountOff(amount_cents),
        (None, None, Some(true)) => DiscountKind::FreeShipping,
        _ => {
            return Err(RepositoryError::Decode(format!(
                "discount code `{code}` violates kind exclusivity"
            )))
        }
    };

    Ok(DiscountCode { code, kind, expires_at: parse_expiration(expires_at)? })
}

#[async_trait::async_trait]
impl DiscountRepository for SqlDiscountRepository {
    async fn add(&self, draft: DiscountDraft) -> Result<DiscountCode, RepositoryError> {
        let discount = draft.validate()?;
        let (percentage, amount_cents, free_shipping) = kind_as_columns(&discount.kind);
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO discount_code (code, percentage, amount_cents, free_shipping,
                                        expires_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&discount.code)
        .bind(percentage)
        .bind(amount_cents)
        .bind(free_shipping)
        .bind(expiration_as_column(&discount.expires_at))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(discount),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(RepositoryError::DuplicateCode(discount.code))
            }
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<DiscountCode>, RepositoryError> {
        let row = sqlx::query(
            "SELECT code, percentage, amount_cents, free_shipping, expires_at
             FROM discount_code WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_discount(r)?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        code: &str,
        patch: DiscountPatch,
    ) -> Result<DiscountCode, RepositoryError> {
        let existing = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| RepositoryError::CodeNotFound(code.to_string()))?;

        let merged = patch.apply_to(&existing).validate()?;
        let (percentage, amount_cents, free_shipping) = kind_as_columns(&merged.kind);

        sqlx::query(
            "UPDATE discount_code
             SET percentage = ?, amount_cents = ?, free_shipping = ?, expires_at = ?,
                 updated_at = ?
             WHERE code = ?",
        )
        .bind(percentage)
        .bind(amount_cents)
        .bind(free_shipping)
        .bind(expiration_as_column(&merged.expires_at))
        .bind(Utc::now().to_rfc3339())
        .bind(&merged.code)
        .execute(&self.pool)
        .await?;

        Ok(merged)
    }
}
