use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("product `{0}` does not exist in the catalog")]
    ProductNotFound(ProductId),
    #[error("product `{0}` is not in the order")]
    ProductNotInOrder(ProductId),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    #[error("exactly one discount kind must be set, got {provided}")]
    KindExclusivity { provided: usize },
    #[error("percentage must be within 1..=100, got {0}")]
    PercentageOutOfRange(i64),
    #[error("amount must be a positive number of cents, got {0}")]
    AmountNotPositive(i64),
    #[error("free_shipping can only be set to true")]
    FreeShippingDisabled,
}
