//! Storage abstraction for orders and their history log.
//!
//! Orders are stored as current-state rows guarded by a version counter;
//! every accepted state change also appends one row to the append-only
//! history log in the same transaction. Updates carry the version the
//! caller read, and a mismatch surfaces as
//! [`StoreError::VersionConflict`](crate::StoreError::VersionConflict).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, OrderNumber, UserId};
use domain::{HistoryEntry, Order, OrderStatus};

use crate::Result;

/// Version counter for optimistic concurrency control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(i64);

impl Version {
    /// The version assigned to a freshly inserted order.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The version a successful update moves to.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order together with the version its row carried when read.
#[derive(Debug, Clone)]
pub struct VersionedOrder {
    pub order: Order,
    pub version: Version,
}

/// Filter for listing orders. All criteria are optional and combine
/// conjunctively.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<UserId>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn created_from(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    pub fn created_to(mut self, to: DateTime<Utc>) -> Self {
        self.created_to = Some(to);
        self
    }

    /// True when the order passes every set criterion.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(user_id) = self.user_id
            && order.user_id != user_id
        {
            return false;
        }
        if let Some(from) = self.created_from
            && order.created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && order.created_at > to
        {
            return false;
        }
        true
    }
}

/// Order storage backend.
///
/// Implementations must make `insert` and `update` atomic with the history
/// append, and must enforce order number uniqueness on insert.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order at [`Version::first`] and appends its initial
    /// history entry. Fails with `DuplicateOrderNumber` if the number is
    /// already taken.
    async fn insert(&self, order: &Order, entry: &HistoryEntry) -> Result<Version>;

    /// Fetches an order by id.
    async fn get(&self, id: OrderId) -> Result<Option<VersionedOrder>>;

    /// Fetches an order by its human-facing order number.
    async fn get_by_number(&self, number: &OrderNumber) -> Result<Option<VersionedOrder>>;

    /// Replaces the order's state and appends a history entry, but only if
    /// the stored version still equals `expected`. Returns the new version.
    async fn update(
        &self,
        order: &Order,
        expected: Version,
        entry: &HistoryEntry,
    ) -> Result<Version>;

    /// Returns the order's history entries, oldest first.
    async fn history(&self, id: OrderId) -> Result<Vec<HistoryEntry>>;

    /// Lists orders matching the filter, newest first.
    async fn query(&self, filter: OrderFilter) -> Result<Vec<Order>>;
}
