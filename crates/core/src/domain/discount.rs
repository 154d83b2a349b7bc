use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DiscountError;

/// The single benefit a discount code grants. A persisted code carries
/// exactly one kind; the write path enforces this before any row is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    /// Percentage off the order subtotal, within 1..=100.
    Percentage(i64),
    /// Flat amount off the order subtotal, in cents.
    AmountOff(i64),
    FreeShipping,
}

impl DiscountKind {
    /// Goods subtotal in cents after applying this discount. Percentage
    /// reductions round in the customer's favor; flat amounts floor at zero.
    /// Free shipping leaves the goods subtotal unchanged.
    pub fn apply(&self, subtotal_cents: i64) -> i64 {
        match self {
            Self::Percentage(percentage) => {
                subtotal_cents - subtotal_cents * percentage / 100
            }
            Self::AmountOff(amount_cents) => (subtotal_cents - amount_cents).max(0),
            Self::FreeShipping => subtotal_cents,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiration {
    /// Stored as an explicit sentinel, not as an absent column.
    Never,
    At(DateTime<Utc>),
}

impl Expiration {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Never => false,
            Self::At(when) => *when <= now,
        }
    }
}

/// A validated discount code, ready to persist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCode {
    pub code: String,
    pub kind: DiscountKind,
    pub expires_at: Expiration,
}

impl DiscountCode {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.expires_at.is_expired_at(now)
    }
}

/// Write-side shape of a discount code, mirroring the store's nullable
/// columns. Validation turns a draft into a [`DiscountCode`] or rejects it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountDraft {
    pub code: String,
    pub percentage: Option<i64>,
    pub amount_cents: Option<i64>,
    pub free_shipping: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl DiscountDraft {
    /// Enforce the exactly-one-of-three kind rule and the per-kind range
    /// checks. An omitted expiration becomes [`Expiration::Never`].
    pub fn validate(self) -> Result<DiscountCode, DiscountError> {
        let provided = usize::from(self.percentage.is_some())
            + usize::from(self.amount_cents.is_some())
            + usize::from(self.free_shipping.is_some());
        if provided != 1 {
            return Err(DiscountError::KindExclusivity { provided });
        }

        let kind = if let Some(percentage) = self.percentage {
            if !(1..=100).contains(&percentage) {
                return Err(DiscountError::PercentageOutOfRange(percentage));
            }
            DiscountKind::Percentage(percentage)
        } else if let Some(amount_cents) = self.amount_cents {
            if amount_cents <= 0 {
                return Err(DiscountError::AmountNotPositive(amount_cents));
            }
            DiscountKind::AmountOff(amount_cents)
        } else if self.free_shipping == Some(true) {
            DiscountKind::FreeShipping
        } else {
            return Err(DiscountError::FreeShippingDisabled);
        };

        let expires_at = match self.expires_at {
            Some(when) => Expiration::At(when),
            None => Expiration::Never,
        };

        Ok(DiscountCode { code: self.code, kind, expires_at })
    }
}

/// Partial overrides for an existing code. `None` keeps the stored value;
/// the update path merges a patch over the stored row and re-validates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPatch {
    pub percentage: Option<i64>,
    pub amount_cents: Option<i64>,
    pub free_shipping: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl DiscountPatch {
    fn touches_kind(&self) -> bool {
        self.percentage.is_some() || self.amount_cents.is_some() || self.free_shipping.is_some()
    }

    /// Merge these overrides over an existing code, producing the draft the
    /// update path re-validates. A patch carrying any kind field replaces the
    /// stored kind wholesale, so switching kinds stays expressible; a patch
    /// without kind fields keeps the stored kind.
    pub fn apply_to(&self, existing: &DiscountCode) -> DiscountDraft {
        let mut draft = DiscountDraft { code: existing.code.clone(), ..DiscountDraft::default() };

        if self.touches_kind() {
            draft.percentage = self.percentage;
            draft.amount_cents = self.amount_cents;
            draft.free_shipping = self.free_shipping;
        } else {
            match existing.kind {
                DiscountKind::Percentage(percentage) => draft.percentage = Some(percentage),
                DiscountKind::AmountOff(amount_cents) => draft.amount_cents = Some(amount_cents),
                DiscountKind::FreeShipping => draft.free_shipping = Some(true),
            }
        }

        draft.expires_at = match (self.expires_at, existing.expires_at) {
            (Some(when), _) => Some(when),
            (None, Expiration::At(when)) => Some(when),
            (None, Expiration::Never) => None,
        };

        draft
    }
}
