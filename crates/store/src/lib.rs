//! Persistence for carts, orders and product inventory.
//!
//! Each store is a trait with an in-memory implementation (tests and
//! single-process runs) and a PostgreSQL implementation.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryCartStore, InMemoryInventoryStore, InMemoryOrderStore};
pub use postgres::{PgCartStore, PgInventoryStore, PgOrderStore, run_migrations};
pub use store::{CartStore, DecrementOutcome, InventoryStore, OrderStore};
