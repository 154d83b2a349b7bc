pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_for, connect_with_settings, DbPool};
pub use fixtures::SeedCatalog;
pub use repositories::{
    load_catalog, DiscountRepository, ProductRepository, RepositoryError, SqlDiscountRepository,
    SqlProductRepository,
};
