use domain::{CreationError, LifecycleError};
use order_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the order service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A lifecycle rule rejected the operation.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Checkout validation rejected the order.
    #[error(transparent)]
    Creation(#[from] CreationError),

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The product catalog could not be reached.
    #[error("catalog unavailable: {0}")]
    Catalog(String),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
