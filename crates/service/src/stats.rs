//! Statistics cache invalidation seam.
//!
//! Order statistics are computed and cached by the reporting layer; the
//! service only needs a way to drop that cache after a committed state
//! change. The trait lives here so the service does not depend on the
//! reporting crate.

use async_trait::async_trait;

/// Trait for invalidating cached order statistics.
#[async_trait]
pub trait StatisticsCache: Send + Sync {
    /// Drops any cached statistics so the next read recomputes them.
    async fn invalidate(&self);
}

/// Cache invalidation target that does nothing, for setups without a
/// statistics cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatisticsCache;

#[async_trait]
impl StatisticsCache for NoopStatisticsCache {
    async fn invalidate(&self) {}
}
