//! Checkout coordination for the marketplace.
//!
//! Checkout turns a user's cart into an order without a distributed
//! transaction:
//! 1. Validate the request and load the cart
//! 2. Persist the order header
//! 3. For each cart item: read stock, persist the order line, decrement stock
//! 4. Clear the cart and confirm the order, or mark it failed
//!
//! Stock lives in the product service and is reached through a
//! [`ProductGateway`], either over HTTP or in process.

pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod services;

pub use coordinator::{CheckoutCoordinator, CheckoutReceipt};
pub use error::{
    CartError, CheckoutError, GatewayError, INSUFFICIENT_STOCK_MESSAGE, InventoryError,
    OrderQueryError,
};
pub use gateway::{
    AUTH_COOKIE, CallerCredential, HttpProductGateway, IDEMPOTENCY_KEY_HEADER,
    InProcessProductGateway, ProductGateway, RetryPolicy,
};
pub use services::{CartService, DecrementAck, InventoryService, OrderDetails, OrderQueries};
