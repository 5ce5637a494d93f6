//! Typed errors for lifecycle and checkout operations.

use common::{OrderId, ProductId};
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors returned by the lifecycle engine and cancellation handler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The requested status change violates the forward-only rule.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order is already delivered or cancelled.
    #[error("order is already terminal in status {0}")]
    AlreadyTerminal(OrderStatus),

    /// Cancellation requires a non-blank reason.
    #[error("a cancellation reason is required")]
    ReasonRequired,

    /// The actor does not hold the capability for this operation.
    #[error("actor {actor} may not {action}")]
    Forbidden { actor: String, action: &'static str },

    /// The order changed between read and write; the caller may retry.
    #[error("order {0} was modified concurrently")]
    Conflict(OrderId),
}

/// Errors returned by order creation (checkout).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreationError {
    /// The cart has no items.
    #[error("order must contain at least one item")]
    EmptyCart,

    /// A cart line references a bad product or quantity.
    #[error("invalid item {product_id}: {reason}")]
    InvalidItem { product_id: ProductId, reason: String },

    /// The delivery address is blank.
    #[error("a delivery address is required")]
    InvalidAddress,
}
