//! Actor identity passed explicitly into lifecycle operations.
//!
//! Authentication itself is out of scope; callers arrive with a resolved
//! role. Passing the actor as a parameter keeps the engine pure and
//! independently testable.

use serde::{Deserialize, Serialize};

/// The capability a caller holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May manage orders through the administrative console.
    Admin,

    /// May place orders; may never advance or cancel them directly.
    Customer,

    /// Internal automation.
    System,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier recorded in history entries.
    pub id: String,

    /// Capability held by the caller.
    pub role: Role,
}

impl Actor {
    /// Creates an administrative actor.
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
        }
    }

    /// Creates a customer actor.
    pub fn customer(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Customer,
        }
    }

    /// Creates the internal system actor.
    pub fn system() -> Self {
        Self {
            id: "system".to_string(),
            role: Role::System,
        }
    }

    /// Returns true if the actor holds the administrative capability.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
