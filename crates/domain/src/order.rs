//! Order, order item, and history entry records.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderNumber, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// A line item on an order.
///
/// `product_name` and `unit_price` are denormalized snapshots taken at
/// order time; later catalog edits must not alter historical orders.
/// `selling_price` is the customer-declared resale price, used only for
/// profit projection — it never affects what the order charges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Product name snapshot at order time.
    pub product_name: String,

    /// Quantity ordered (>= 1).
    pub quantity: u32,

    /// Wholesale unit price snapshot at order time.
    pub unit_price: Money,

    /// `unit_price * quantity`, fixed at creation.
    pub total_price: Money,

    /// Customer-declared resale price, if provided.
    pub selling_price: Option<Money>,
}

impl OrderItem {
    /// Creates a new order item, computing the line total.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
        selling_price: Option<Money>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            total_price: unit_price.multiply(quantity),
            selling_price,
        }
    }
}

/// An order record.
///
/// `status` is mutated only through the lifecycle engine; each milestone
/// timestamp is written at most once, by the transition that enters the
/// corresponding status. `cancellation_reason` is Some iff the order is
/// cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier, assigned at creation.
    pub id: OrderId,

    /// Human-readable unique order number.
    pub order_number: OrderNumber,

    /// Customer who placed the order.
    pub user_id: UserId,

    /// Current fulfillment status.
    pub status: OrderStatus,

    /// Line items, non-empty and fixed at creation.
    pub items: Vec<OrderItem>,

    /// Sum of line totals, fixed at creation.
    pub total_amount: Money,

    /// Delivery address, required at creation.
    pub delivery_address: String,

    /// Optional delivery notes.
    pub delivery_notes: Option<String>,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// Milestone timestamps, each set at most once.
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,

    /// Cancellation reason, present iff `status == Cancelled`.
    pub cancellation_reason: Option<String>,
}

impl Order {
    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Recomputes the order total from the line totals.
    ///
    /// The stored `total_amount` must always equal this value; the check is
    /// exposed for tests and store sanity assertions.
    pub fn computed_total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.total_price)
    }
}

/// One immutable audit record of a status transition.
///
/// The ordered sequence of entries for an order reconstructs its full
/// transition history, starting with a `pending` entry at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The order this entry belongs to.
    pub order_id: OrderId,

    /// The status the order entered.
    pub status: OrderStatus,

    /// Operator-supplied notes, if any.
    pub notes: Option<String>,

    /// Actor identifier, or `"system"`.
    pub created_by: String,

    /// When the transition happened.
    pub created_at: DateTime<Utc>,
}
