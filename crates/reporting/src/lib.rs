//! Read-side reporting: cached aggregate statistics over orders.

pub mod error;
pub mod statistics;

pub use error::{ReportingError, Result};
pub use statistics::{OrderStatistics, StatisticsService};
