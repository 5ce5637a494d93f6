use common::{OrderId, OrderNumber};
use thiserror::Error;

/// Errors surfaced by order storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The order's stored version no longer matches the version the
    /// caller read. The caller may reload and retry.
    #[error("version conflict on order {order_id}: expected {expected}, found {actual}")]
    VersionConflict {
        order_id: OrderId,
        expected: i64,
        actual: i64,
    },

    /// Another order already holds this order number.
    #[error("duplicate order number: {0}")]
    DuplicateOrderNumber(OrderNumber),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
