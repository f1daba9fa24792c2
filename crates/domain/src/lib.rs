//! Domain layer for the marketplace services.
//!
//! This crate holds the entities and the pure rules the services enforce:
//! - Cart and cart item quantity rules
//! - Order header, order lines, statuses and checkout request validation
//! - Product stock counter and its derived availability status

pub mod cart;
pub mod error;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem, CartStatus, MAX_ITEM_QUANTITY, QuantityChange};
pub use common::{CartId, Money, OrderId, OrderLineId, ProductId, UserId};
pub use error::{DomainError, ValidationError};
pub use order::{
    CheckoutDetails, CheckoutRequest, CheckoutStatus, DELIVERY_WINDOW_DAYS, DeliveryAddress,
    DeliveryAddressInput, DeliveryStatus, Order, OrderLine, OrderSummary, PaymentMethod,
    PaymentStatus, order_total, total_items,
};
pub use product::{AvailabilityStatus, LOW_STOCK_THRESHOLD, ProductStock, StockError};
