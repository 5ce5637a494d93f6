//! Order fulfillment status state machine.

use serde::{Deserialize, Serialize};

/// The fulfillment status of an order.
///
/// Forward order:
/// ```text
/// Pending ──► Confirmed ──► Preparing ──► ReadyToShip ──► Shipped ──► Delivered
///    │             │             │              │             │
///    └─────────────┴─────────────┴──────────────┴─────────────┴──► Cancelled
/// ```
///
/// `advance` may target any strictly-later forward state (the admin console
/// offers every later state as a candidate), so the history log can record
/// a jump such as `Pending -> Shipped`. `Delivered` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed and awaits confirmation.
    #[default]
    Pending,

    /// Order accepted; inventory reservation is triggered externally here.
    Confirmed,

    /// Order is being picked and packed.
    Preparing,

    /// Order is packed and waiting for pickup.
    ReadyToShip,

    /// Order has left the warehouse.
    Shipped,

    /// Order reached the customer (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// All forward states in lifecycle order. `Cancelled` is not a forward
    /// state; it is reached only through the cancellation operation.
    pub const FORWARD: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyToShip,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    /// Position of this status in the forward order, None for `Cancelled`.
    pub fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::ReadyToShip => Some(3),
            OrderStatus::Shipped => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Cancelled => None,
        }
    }

    /// Returns true if this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if `advance` may move an order from this status to
    /// `target`.
    ///
    /// The rule is relaxed forward-skip: the target must be a forward state
    /// strictly later than the current one. A transition to the current
    /// status is rejected rather than treated as a silent no-op.
    pub fn can_advance_to(&self, target: OrderStatus) -> bool {
        match (self.rank(), target.rank()) {
            (Some(from), Some(to)) => !self.is_terminal() && to > from,
            _ => false,
        }
    }

    /// Returns true if the cancellation operation applies in this status.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::ReadyToShip => "ready_to_ship",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready_to_ship" => Ok(OrderStatus::ReadyToShip),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
