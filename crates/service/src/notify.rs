//! Customer notification trait and in-memory implementation.
//!
//! Notifications run after the state change has been committed. A failed
//! dispatch is logged and counted but never rolls the transition back.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::OrderStatus;
use thiserror::Error;

/// Error returned when a notification cannot be delivered.
#[derive(Debug, Clone, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// A status-change message for a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
}

/// Trait for delivering status-change notifications.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers a notification to the customer.
    async fn dispatch(&self, notification: StatusNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<StatusNotification>,
    fail_on_dispatch: bool,
}

/// In-memory notifier for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail on the next dispatch.
    pub fn set_fail_on_dispatch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_dispatch = fail;
    }

    /// Returns all notifications delivered so far.
    pub fn sent(&self) -> Vec<StatusNotification> {
        self.state.read().unwrap().sent.clone()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotifier {
    async fn dispatch(&self, notification: StatusNotification) -> Result<(), NotifyError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_dispatch {
            return Err(NotifyError("notifier unavailable".to_string()));
        }

        state.sent.push(notification);
        Ok(())
    }
}
