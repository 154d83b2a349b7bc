pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod money;

pub use catalog::{Catalog, InMemoryCatalog};
pub use config::{
    AppConfig, ConfigError, ConfigOverrides, DatabaseConfig, LoadOptions, LogFormat, LoggingConfig,
};
pub use domain::discount::{DiscountCode, DiscountDraft, DiscountKind, DiscountPatch, Expiration};
pub use domain::order::{Order, OrderId, OrderTotal};
pub use domain::product::{Product, ProductId};
pub use errors::{DiscountError, OrderError};
pub use money::format_cents;
