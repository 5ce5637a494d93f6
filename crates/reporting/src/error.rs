use order_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the reporting layer.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for reporting operations.
pub type Result<T> = std::result::Result<T, ReportingError>;
