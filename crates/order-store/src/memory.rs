use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, OrderNumber};
use domain::{HistoryEntry, Order};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{OrderFilter, OrderStore, Version, VersionedOrder},
};

#[derive(Default)]
struct State {
    rows: HashMap<OrderId, VersionedOrder>,
    numbers: HashMap<OrderNumber, OrderId>,
    history: Vec<HistoryEntry>,
}

/// In-memory order store implementation for testing and local runs.
///
/// A single lock over the whole state keeps the insert and update paths
/// atomic with their history appends, matching the transactional behavior
/// of the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Clears all orders and history.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.rows.clear();
        state.numbers.clear();
        state.history.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order, entry: &HistoryEntry) -> Result<Version> {
        let mut state = self.state.write().await;

        if state.numbers.contains_key(&order.order_number) {
            return Err(StoreError::DuplicateOrderNumber(order.order_number.clone()));
        }

        let version = Version::first();
        state.numbers.insert(order.order_number.clone(), order.id);
        state.rows.insert(
            order.id,
            VersionedOrder {
                order: order.clone(),
                version,
            },
        );
        state.history.push(entry.clone());

        Ok(version)
    }

    async fn get(&self, id: OrderId) -> Result<Option<VersionedOrder>> {
        let state = self.state.read().await;
        Ok(state.rows.get(&id).cloned())
    }

    async fn get_by_number(&self, number: &OrderNumber) -> Result<Option<VersionedOrder>> {
        let state = self.state.read().await;
        let Some(id) = state.numbers.get(number) else {
            return Ok(None);
        };
        Ok(state.rows.get(id).cloned())
    }

    async fn update(
        &self,
        order: &Order,
        expected: Version,
        entry: &HistoryEntry,
    ) -> Result<Version> {
        let mut state = self.state.write().await;

        let current = state
            .rows
            .get(&order.id)
            .ok_or(StoreError::NotFound(order.id))?;

        if current.version != expected {
            return Err(StoreError::VersionConflict {
                order_id: order.id,
                expected: expected.as_i64(),
                actual: current.version.as_i64(),
            });
        }

        let version = expected.next();
        state.rows.insert(
            order.id,
            VersionedOrder {
                order: order.clone(),
                version,
            },
        );
        state.history.push(entry.clone());

        Ok(version)
    }

    async fn history(&self, id: OrderId) -> Result<Vec<HistoryEntry>> {
        let state = self.state.read().await;
        // Insertion order is chronological; no re-sort needed.
        Ok(state
            .history
            .iter()
            .filter(|e| e.order_id == id)
            .cloned()
            .collect())
    }

    async fn query(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .rows
            .values()
            .filter(|row| filter.matches(&row.order))
            .map(|row| row.order.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
