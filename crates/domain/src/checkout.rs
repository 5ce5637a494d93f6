//! Order creation (checkout) validation.
//!
//! The service layer resolves cart lines against the product catalog and
//! hands fully-snapshotted items here; this module validates and assembles
//! the `pending` order together with its initial history entry.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderNumber, ProductId, UserId};

use crate::error::CreationError;
use crate::order::{HistoryEntry, Order, OrderItem};
use crate::status::OrderStatus;

/// A cart line with product data already snapshotted from the catalog.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub selling_price: Option<Money>,
}

/// Input for assembling a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub items: Vec<NewOrderItem>,
    pub delivery_address: String,
    pub delivery_notes: Option<String>,
}

/// Validates and assembles an order in `pending` status.
///
/// Returns the order and its initial history entry; the store persists the
/// two as one atomic unit. Line totals and the order total are computed
/// here and never independently edited afterwards.
pub fn create(new_order: NewOrder, now: DateTime<Utc>) -> Result<(Order, HistoryEntry), CreationError> {
    if new_order.items.is_empty() {
        return Err(CreationError::EmptyCart);
    }

    let address = new_order.delivery_address.trim();
    if address.is_empty() {
        return Err(CreationError::InvalidAddress);
    }

    let mut items = Vec::with_capacity(new_order.items.len());
    for line in new_order.items {
        if line.quantity == 0 {
            return Err(CreationError::InvalidItem {
                product_id: line.product_id,
                reason: "quantity must be at least 1".to_string(),
            });
        }
        if line.unit_price.is_negative() {
            return Err(CreationError::InvalidItem {
                product_id: line.product_id,
                reason: "unit price must not be negative".to_string(),
            });
        }
        items.push(OrderItem::new(
            line.product_id,
            line.product_name,
            line.quantity,
            line.unit_price,
            line.selling_price,
        ));
    }

    let total_amount = items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.total_price);

    let order = Order {
        id: new_order.id,
        order_number: new_order.order_number,
        user_id: new_order.user_id,
        status: OrderStatus::Pending,
        items,
        total_amount,
        delivery_address: address.to_string(),
        delivery_notes: new_order.delivery_notes,
        created_at: now,
        confirmed_at: None,
        shipped_at: None,
        delivered_at: None,
        cancelled_at: None,
        cancellation_reason: None,
    };

    let entry = HistoryEntry {
        order_id: order.id,
        status: OrderStatus::Pending,
        notes: None,
        created_by: order.user_id.to_string(),
        created_at: now,
    };

    Ok((order, entry))
}
