use async_trait::async_trait;
use thiserror::Error;

use storefront_core::domain::discount::{DiscountCode, DiscountDraft, DiscountPatch};
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::errors::DiscountError;

pub mod discount;
pub mod product;

pub use discount::SqlDiscountRepository;
pub use product::{load_catalog, SqlProductRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Validation(#[from] DiscountError),
    #[error("discount code `{0}` already exists")]
    DuplicateCode(String),
    #[error("discount code `{0}` not found")]
    CodeNotFound(String),
}

#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Validate `draft` and insert it as a new row. A duplicate code fails
    /// with [`RepositoryError::DuplicateCode`].
    async fn add(&self, draft: DiscountDraft) -> Result<DiscountCode, RepositoryError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<DiscountCode>, RepositoryError>;

    /// Fetch the stored code, merge the caller's partial overrides, re-run
    /// the exactly-one-of-three validation, and rewrite the row.
    async fn update(
        &self,
        code: &str,
        patch: DiscountPatch,
    ) -> Result<DiscountCode, RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;
}
