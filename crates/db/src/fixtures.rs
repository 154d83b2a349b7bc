//! Deterministic seed data for tests and local development.

use storefront_core::domain::product::{Product, ProductId};

use crate::repositories::{ProductRepository, RepositoryError, SqlProductRepository};
use crate::DbPool;

/// (id, name, unit price in cents)
const SEED_PRODUCTS: &[(&str, &str, i64)] = &[
    ("prod-doohickey", "Doohickey", 75),
    ("prod-gadget", "Gadget", 300),
    ("prod-gizmo", "Gizmo", 1299),
    ("prod-widget", "Widget", 150),
];

/// Canonical product dataset shared by the db tests and any local harness
/// that needs a populated catalog.
pub struct SeedCatalog;

impl SeedCatalog {
    pub fn products() -> Vec<Product> {
        SEED_PRODUCTS
            .iter()
            .map(|(id, name, unit_price_cents)| Product {
                id: ProductId((*id).to_string()),
                name: (*name).to_string(),
                unit_price_cents: *unit_price_cents,
            })
            .collect()
    }

    /// Load the seed products into the database. Idempotent: re-loading
    /// overwrites rather than duplicating.
    pub async fn load(pool: &DbPool) -> Result<(), RepositoryError> {
        let repository = SqlProductRepository::new(pool.clone());
        for product in Self::products() {
            repository.save(product).await?;
        }
        Ok(())
    }
}
