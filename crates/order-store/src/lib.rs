//! Order storage: versioned current-state rows plus an append-only
//! history log, with in-memory and PostgreSQL backends.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::{OrderFilter, OrderStore, Version, VersionedOrder};
