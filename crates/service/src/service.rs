//! The order service: orchestration around the pure lifecycle engine.
//!
//! Every write follows the same shape: read the current order with its
//! version, let the engine plan the transition, persist the plan with the
//! version guard, and execute side effects only after the commit. Version
//! conflicts reload and retry a bounded number of times.

use std::sync::Arc;

use chrono::Utc;
use common::{Money, OrderId, OrderNumber, ProductId, UserId};
use domain::checkout::{self, NewOrder, NewOrderItem};
use domain::{Actor, CreationError, HistoryEntry, LifecycleError, Order, OrderStatus, SideEffect};
use domain::{ProfitReport, Transition, profit_report};
use metrics::counter;
use order_store::{OrderFilter, OrderStore, StoreError, VersionedOrder};
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::error::{Result, ServiceError};
use crate::notify::{NotificationDispatcher, StatusNotification};
use crate::stats::StatisticsCache;

/// Reloads and replans at most this many times on a version conflict.
const MAX_CONFLICT_RETRIES: u32 = 3;

/// Regenerates the order number at most this many times on a duplicate.
const MAX_NUMBER_ATTEMPTS: u32 = 5;

/// A cart line as submitted by the caller. Product name and unit price
/// are resolved from the catalog, not trusted from the request.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub selling_price: Option<Money>,
}

/// Input for placing an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub delivery_address: String,
    pub delivery_notes: Option<String>,
}

/// Per-order outcome of a bulk status advance.
#[derive(Debug)]
pub struct BulkOutcome {
    pub order_id: OrderId,
    pub result: std::result::Result<Order, ServiceError>,
}

/// Orchestrates order creation, status transitions and read paths over a
/// storage backend.
#[derive(Clone)]
pub struct OrderService<S> {
    store: Arc<S>,
    catalog: Arc<dyn ProductCatalog>,
    notifier: Arc<dyn NotificationDispatcher>,
    stats: Arc<dyn StatisticsCache>,
}

impl<S: OrderStore> OrderService<S> {
    pub fn new(
        store: Arc<S>,
        catalog: Arc<dyn ProductCatalog>,
        notifier: Arc<dyn NotificationDispatcher>,
        stats: Arc<dyn StatisticsCache>,
    ) -> Self {
        Self {
            store,
            catalog,
            notifier,
            stats,
        }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Places a new order.
    ///
    /// Cart lines are resolved against the catalog so the order carries a
    /// snapshot of each product's name and price. The generated order
    /// number is retried on the rare duplicate.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order> {
        let mut items = Vec::with_capacity(request.items.len());
        for line in request.items {
            let product = self.catalog.get(&line.product_id).await?.ok_or_else(|| {
                CreationError::InvalidItem {
                    product_id: line.product_id.clone(),
                    reason: "unknown product".to_string(),
                }
            })?;
            if !product.active {
                return Err(CreationError::InvalidItem {
                    product_id: line.product_id,
                    reason: "product is not available".to_string(),
                }
                .into());
            }
            items.push(NewOrderItem {
                product_id: product.product_id,
                product_name: product.name,
                quantity: line.quantity,
                unit_price: product.unit_price,
                selling_price: line.selling_price,
            });
        }

        let mut attempts = 0;
        loop {
            let now = Utc::now();
            let (order, entry) = checkout::create(
                NewOrder {
                    id: OrderId::new(),
                    order_number: generate_order_number(),
                    user_id: request.user_id,
                    items: items.clone(),
                    delivery_address: request.delivery_address.clone(),
                    delivery_notes: request.delivery_notes.clone(),
                },
                now,
            )?;

            match self.store.insert(&order, &entry).await {
                Ok(_) => {
                    counter!("orders_created_total").increment(1);
                    tracing::info!(
                        order_id = %order.id,
                        order_number = %order.order_number,
                        total_cents = order.total_amount.cents(),
                        "order placed"
                    );
                    self.stats.invalidate().await;
                    return Ok(order);
                }
                Err(StoreError::DuplicateOrderNumber(number)) => {
                    attempts += 1;
                    if attempts >= MAX_NUMBER_ATTEMPTS {
                        return Err(StoreError::DuplicateOrderNumber(number).into());
                    }
                    tracing::debug!(%number, attempts, "order number collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Advances an order to a later forward status.
    #[tracing::instrument(skip(self, actor, notes), fields(actor = %actor.id, target = %target))]
    pub async fn advance_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Order> {
        let order = self
            .transition_with_retry(order_id, |order| {
                domain::advance(order, target, actor, notes.clone(), Utc::now())
            })
            .await?;

        counter!("order_transitions_total", "to" => target.as_str()).increment(1);
        Ok(order)
    }

    /// Cancels an order with a mandatory reason.
    #[tracing::instrument(skip(self, actor, reason), fields(actor = %actor.id))]
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        actor: &Actor,
        reason: &str,
    ) -> Result<Order> {
        let order = self
            .transition_with_retry(order_id, |order| {
                domain::cancel(order, actor, reason, Utc::now())
            })
            .await?;

        counter!("order_cancellations_total").increment(1);
        Ok(order)
    }

    /// Advances many orders to the same target, independently. Each order
    /// gets its own outcome; one failure never aborts the rest.
    #[tracing::instrument(skip(self, order_ids, actor, notes), fields(count = order_ids.len(), target = %target))]
    pub async fn advance_many(
        &self,
        order_ids: Vec<OrderId>,
        target: OrderStatus,
        actor: &Actor,
        notes: Option<String>,
    ) -> Vec<BulkOutcome> {
        let mut outcomes = Vec::with_capacity(order_ids.len());
        for order_id in order_ids {
            let result = self
                .advance_status(order_id, target, actor, notes.clone())
                .await;
            outcomes.push(BulkOutcome { order_id, result });
        }
        outcomes
    }

    /// Fetches an order by id.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.require(order_id).await.map(|v| v.order)
    }

    /// Fetches an order by its order number.
    pub async fn get_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>> {
        Ok(self.store.get_by_number(number).await?.map(|v| v.order))
    }

    /// Returns an order's history entries, oldest first.
    pub async fn order_history(&self, order_id: OrderId) -> Result<Vec<HistoryEntry>> {
        self.require(order_id).await?;
        Ok(self.store.history(order_id).await?)
    }

    /// Lists orders matching the filter, newest first.
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        Ok(self.store.query(filter).await?)
    }

    /// Computes the wholesale profit report for an order.
    pub async fn order_profit(&self, order_id: OrderId) -> Result<ProfitReport> {
        let versioned = self.require(order_id).await?;
        Ok(profit_report(&versioned.order))
    }

    async fn require(&self, order_id: OrderId) -> Result<VersionedOrder> {
        self.store
            .get(order_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(order_id).into())
    }

    /// Read-plan-write with a bounded retry on version conflicts. The
    /// closure replans from the freshly loaded order on every attempt, so
    /// rules are always checked against current state.
    async fn transition_with_retry<F>(&self, order_id: OrderId, plan: F) -> Result<Order>
    where
        F: Fn(&Order) -> std::result::Result<Transition, LifecycleError>,
    {
        for attempt in 0..MAX_CONFLICT_RETRIES {
            let versioned = self.require(order_id).await?;
            let transition = plan(&versioned.order)?;

            match self
                .store
                .update(&transition.order, versioned.version, &transition.entry)
                .await
            {
                Ok(_) => {
                    self.run_effects(transition.effects).await;
                    return Ok(transition.order);
                }
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::debug!(%order_id, attempt, "version conflict, reloading");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LifecycleError::Conflict(order_id).into())
    }

    async fn run_effects(&self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::NotifyCustomer {
                    order_id,
                    user_id,
                    status,
                } => {
                    let notification = StatusNotification {
                        order_id,
                        user_id,
                        status,
                    };
                    if let Err(e) = self.notifier.dispatch(notification).await {
                        counter!("notification_failures_total").increment(1);
                        tracing::warn!(%order_id, error = %e, "customer notification failed");
                    }
                }
                SideEffect::InvalidateStatistics => {
                    self.stats.invalidate().await;
                }
            }
        }
    }
}

/// Generates a candidate order number: `WS-YYYYMMDD-XXXXXX` with a random
/// hex suffix. Uniqueness is enforced by the store, not here.
fn generate_order_number() -> OrderNumber {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    OrderNumber::new(format!("WS-{}-{}", Utc::now().format("%Y%m%d"), suffix))
}
