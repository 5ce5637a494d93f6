//! Order orchestration: checkout against the product catalog, versioned
//! status transitions with retry, and post-commit side effects.

pub mod catalog;
pub mod error;
pub mod notify;
pub mod service;
pub mod stats;

pub use catalog::{CatalogProduct, InMemoryProductCatalog, ProductCatalog};
pub use error::{Result, ServiceError};
pub use notify::{InMemoryNotifier, NotificationDispatcher, NotifyError, StatusNotification};
pub use service::{BulkOutcome, CartLine, OrderService, PlaceOrder};
pub use stats::{NoopStatisticsCache, StatisticsCache};
