//! Core domain for the wholesale order platform.
//!
//! This crate holds the pure decision logic of the system:
//! - [`OrderStatus`] state machine with the relaxed forward-skip rule
//! - [`Order`], [`OrderItem`], and [`HistoryEntry`] data model
//! - the lifecycle engine ([`advance`], [`cancel`]) returning a
//!   [`Transition`] with side-effect descriptions for the caller
//! - checkout validation and the wholesale profit calculator
//!
//! Nothing here performs I/O; storage and side-effect execution belong to
//! the service layer.

pub mod actor;
pub mod checkout;
pub mod error;
pub mod lifecycle;
pub mod order;
pub mod status;
pub mod wholesale;

pub use actor::{Actor, Role};
pub use checkout::{NewOrder, NewOrderItem};
pub use error::{CreationError, LifecycleError};
pub use lifecycle::{SideEffect, Transition, advance, cancel};
pub use order::{HistoryEntry, Order, OrderItem};
pub use status::OrderStatus;
pub use wholesale::{ItemProfit, ProfitReport, profit_report};
