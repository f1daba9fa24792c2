//! Shared identifier and money types used across the marketplace crates.

mod money;
mod types;

pub use money::Money;
pub use types::{CartId, OrderId, OrderLineId, ProductId, UserId};
