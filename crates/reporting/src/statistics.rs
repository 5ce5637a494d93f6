//! Aggregate order statistics with a simple cache.
//!
//! The unfiltered summary is cached until the service layer invalidates it
//! after a committed state change. Filtered summaries are always computed
//! fresh.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::Money;
use domain::{Order, OrderStatus};
use order_store::{OrderFilter, OrderStore};
use serde::Serialize;
use service::StatisticsCache;
use tokio::sync::RwLock;

use crate::error::Result;

/// Aggregate figures over a set of orders.
///
/// Cancelled orders count toward `total_orders` and the per-status
/// breakdown but are excluded from revenue and the average.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatistics {
    pub total_orders: usize,
    pub orders_by_status: HashMap<OrderStatus, usize>,
    pub total_revenue: Money,
    pub average_order_value: Money,
}

impl OrderStatistics {
    fn compute(orders: &[Order]) -> Self {
        let mut orders_by_status: HashMap<OrderStatus, usize> = HashMap::new();
        let mut total_revenue = Money::zero();
        let mut revenue_orders = 0_i64;

        for order in orders {
            *orders_by_status.entry(order.status).or_insert(0) += 1;
            if order.status != OrderStatus::Cancelled {
                total_revenue += order.total_amount;
                revenue_orders += 1;
            }
        }

        let average_order_value = if revenue_orders == 0 {
            Money::zero()
        } else {
            Money::from_cents(total_revenue.cents() / revenue_orders)
        };

        Self {
            total_orders: orders.len(),
            orders_by_status,
            total_revenue,
            average_order_value,
        }
    }
}

/// Computes and caches order statistics over a storage backend.
pub struct StatisticsService<S> {
    store: Arc<S>,
    cached: RwLock<Option<OrderStatistics>>,
}

impl<S: OrderStore> StatisticsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cached: RwLock::new(None),
        }
    }

    /// Returns the overall statistics, served from cache when warm.
    #[tracing::instrument(skip(self))]
    pub async fn summary(&self) -> Result<OrderStatistics> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let orders = self.store.query(OrderFilter::new()).await?;
        let stats = OrderStatistics::compute(&orders);

        let mut slot = self.cached.write().await;
        *slot = Some(stats.clone());
        Ok(stats)
    }

    /// Computes statistics over a filtered order set, bypassing the cache.
    pub async fn filtered(&self, filter: OrderFilter) -> Result<OrderStatistics> {
        let orders = self.store.query(filter).await?;
        Ok(OrderStatistics::compute(&orders))
    }
}

#[async_trait]
impl<S: OrderStore> StatisticsCache for StatisticsService<S> {
    async fn invalidate(&self) {
        let mut slot = self.cached.write().await;
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{OrderId, OrderNumber, UserId};
    use domain::checkout::{self, NewOrder, NewOrderItem};
    use domain::{Actor, cancel};
    use order_store::InMemoryOrderStore;

    async fn seed_order(store: &InMemoryOrderStore, number: &str, total_cents: i64) -> Order {
        let (order, entry) = checkout::create(
            NewOrder {
                id: OrderId::new(),
                order_number: OrderNumber::new(number),
                user_id: UserId::new(),
                items: vec![NewOrderItem {
                    product_id: "SKU-001".into(),
                    product_name: "Widget".to_string(),
                    quantity: 1,
                    unit_price: Money::from_cents(total_cents),
                    selling_price: None,
                }],
                delivery_address: "1 Warehouse Way".to_string(),
                delivery_notes: None,
            },
            Utc::now(),
        )
        .unwrap();
        store.insert(&order, &entry).await.unwrap();
        order
    }

    #[tokio::test]
    async fn cancelled_orders_excluded_from_revenue() {
        let store = Arc::new(InMemoryOrderStore::new());
        seed_order(&store, "WS-20250101-STAT01", 10_000).await;
        let doomed = seed_order(&store, "WS-20250101-STAT02", 20_000).await;

        let admin = Actor::admin("alice");
        let transition = cancel(&doomed, &admin, "stock damaged", Utc::now()).unwrap();
        store
            .update(
                &transition.order,
                order_store::Version::first(),
                &transition.entry,
            )
            .await
            .unwrap();

        let service = StatisticsService::new(store);
        let stats = service.summary().await.unwrap();

        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_revenue.cents(), 10_000);
        assert_eq!(stats.average_order_value.cents(), 10_000);
        assert_eq!(stats.orders_by_status[&OrderStatus::Pending], 1);
        assert_eq!(stats.orders_by_status[&OrderStatus::Cancelled], 1);
    }

    #[tokio::test]
    async fn empty_store_yields_zeroes() {
        let store = Arc::new(InMemoryOrderStore::new());
        let service = StatisticsService::new(store);

        let stats = service.summary().await.unwrap();
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_revenue, Money::zero());
        assert_eq!(stats.average_order_value, Money::zero());
        assert!(stats.orders_by_status.is_empty());
    }

    #[tokio::test]
    async fn summary_is_cached_until_invalidated() {
        let store = Arc::new(InMemoryOrderStore::new());
        seed_order(&store, "WS-20250101-STAT03", 5_000).await;

        let service = StatisticsService::new(store.clone());
        let first = service.summary().await.unwrap();
        assert_eq!(first.total_orders, 1);

        // A write the cache has not seen yet.
        seed_order(&store, "WS-20250101-STAT04", 5_000).await;
        let stale = service.summary().await.unwrap();
        assert_eq!(stale.total_orders, 1);

        service.invalidate().await;
        let fresh = service.summary().await.unwrap();
        assert_eq!(fresh.total_orders, 2);
    }

    #[tokio::test]
    async fn filtered_bypasses_cache() {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = seed_order(&store, "WS-20250101-STAT05", 5_000).await;
        seed_order(&store, "WS-20250101-STAT06", 7_000).await;

        let service = StatisticsService::new(store);
        let mine = service
            .filtered(OrderFilter::new().user_id(order.user_id))
            .await
            .unwrap();
        assert_eq!(mine.total_orders, 1);
        assert_eq!(mine.total_revenue.cents(), 5_000);
    }

    #[tokio::test]
    async fn average_truncates_to_whole_cents() {
        let store = Arc::new(InMemoryOrderStore::new());
        seed_order(&store, "WS-20250101-STAT07", 1_001).await;
        seed_order(&store, "WS-20250101-STAT08", 1_000).await;

        let service = StatisticsService::new(store);
        let stats = service.summary().await.unwrap();
        assert_eq!(stats.average_order_value.cents(), 1_000);
    }
}
