//! Shared types for the wholesale order platform.

pub mod types;

pub use types::{Money, OrderId, OrderNumber, ProductId, UserId};
