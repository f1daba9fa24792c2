//! Services behind the order and product HTTP surfaces.

pub mod cart;
pub mod inventory;
pub mod orders;

pub use cart::CartService;
pub use inventory::{DecrementAck, InventoryService};
pub use orders::{OrderDetails, OrderQueries};
