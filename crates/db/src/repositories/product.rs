use chrono::Utc;
use sqlx::Row;

use storefront_core::catalog::InMemoryCatalog;
use storefront_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let unit_price_cents: i64 =
        row.try_get("unit_price_cents").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Product { id: ProductId(id), name, unit_price_cents })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, unit_price_cents FROM product WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO product (id, name, unit_price_cents, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 unit_price_cents = excluded.unit_price_cents,
                 updated_at = excluded.updated_at",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(product.unit_price_cents)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query("SELECT id, name, unit_price_cents FROM product ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }
}

/// Snapshot the product table into the synchronous catalog the order
/// aggregate consumes.
pub async fn load_catalog(pool: &DbPool) -> Result<InMemoryCatalog, RepositoryError> {
    let repository = SqlProductRepository::new(pool.clone());
    Ok(InMemoryCatalog::new(repository.list_all().await?))
}
