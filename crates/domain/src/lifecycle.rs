//! The lifecycle engine: pure transition planning.
//!
//! [`advance`] and [`cancel`] inspect an order and produce a [`Transition`]
//! without touching storage. The caller persists the updated order and
//! history entry atomically (the store's versioned update) and then
//! executes the returned [`SideEffect`]s. Keeping the engine pure makes
//! every rule unit-testable without a store or a clock.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};

use crate::actor::Actor;
use crate::error::LifecycleError;
use crate::order::{HistoryEntry, Order};
use crate::status::OrderStatus;

/// An instruction for the orchestration layer, produced by a successful
/// transition. The engine never performs these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Tell the customer their order entered a new status.
    NotifyCustomer {
        order_id: OrderId,
        user_id: UserId,
        status: OrderStatus,
    },

    /// Drop any cached statistics keyed by order status.
    InvalidateStatistics,
}

/// The outcome of a successful lifecycle decision: the updated order, the
/// history entry to append, and the side effects to execute after commit.
#[derive(Debug, Clone)]
pub struct Transition {
    pub order: Order,
    pub entry: HistoryEntry,
    pub effects: Vec<SideEffect>,
}

/// Plans a forward status transition.
///
/// Rules:
/// - only administrators may advance an order
/// - `Cancelled` is never a valid target here (see [`cancel`])
/// - terminal orders reject with [`LifecycleError::AlreadyTerminal`]
/// - the target must be strictly later in the forward order; a transition
///   to the current status is an error, not a silent success
///
/// On success the corresponding milestone timestamp is set, but only if it
/// is not already set — milestone timestamps are write-once.
pub fn advance(
    order: &Order,
    target: OrderStatus,
    actor: &Actor,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<Transition, LifecycleError> {
    if !actor.is_admin() {
        return Err(LifecycleError::Forbidden {
            actor: actor.id.clone(),
            action: "advance order status",
        });
    }

    if target == OrderStatus::Cancelled {
        return Err(LifecycleError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    if order.is_terminal() {
        return Err(LifecycleError::AlreadyTerminal(order.status));
    }

    if !order.status.can_advance_to(target) {
        return Err(LifecycleError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    let mut updated = order.clone();
    updated.status = target;

    match target {
        OrderStatus::Confirmed => {
            updated.confirmed_at.get_or_insert(now);
        }
        OrderStatus::Shipped => {
            updated.shipped_at.get_or_insert(now);
        }
        OrderStatus::Delivered => {
            updated.delivered_at.get_or_insert(now);
        }
        _ => {}
    }

    let entry = HistoryEntry {
        order_id: order.id,
        status: target,
        notes,
        created_by: actor.id.clone(),
        created_at: now,
    };

    Ok(Transition {
        effects: transition_effects(&updated),
        order: updated,
        entry,
    })
}

/// Plans a cancellation.
///
/// Requires an administrative actor and a reason that is non-empty after
/// trimming. Terminal orders reject with `AlreadyTerminal`; cancellation
/// is irreversible.
pub fn cancel(
    order: &Order,
    actor: &Actor,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<Transition, LifecycleError> {
    if !actor.is_admin() {
        return Err(LifecycleError::Forbidden {
            actor: actor.id.clone(),
            action: "cancel order",
        });
    }

    if order.is_terminal() {
        return Err(LifecycleError::AlreadyTerminal(order.status));
    }

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(LifecycleError::ReasonRequired);
    }

    let mut updated = order.clone();
    updated.status = OrderStatus::Cancelled;
    updated.cancelled_at.get_or_insert(now);
    updated.cancellation_reason = Some(reason.to_string());

    let entry = HistoryEntry {
        order_id: order.id,
        status: OrderStatus::Cancelled,
        notes: Some(reason.to_string()),
        created_by: actor.id.clone(),
        created_at: now,
    };

    Ok(Transition {
        effects: transition_effects(&updated),
        order: updated,
        entry,
    })
}

fn transition_effects(order: &Order) -> Vec<SideEffect> {
    vec![
        SideEffect::NotifyCustomer {
            order_id: order.id,
            user_id: order.user_id,
            status: order.status,
        },
        SideEffect::InvalidateStatistics,
    ]
}
