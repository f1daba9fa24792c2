//! Orders, order lines and checkout input.

mod model;
mod request;
mod status;

pub use model::{DELIVERY_WINDOW_DAYS, Order, OrderLine, OrderSummary, order_total, total_items};
pub use request::{CheckoutDetails, CheckoutRequest, DeliveryAddress, DeliveryAddressInput};
pub use status::{CheckoutStatus, DeliveryStatus, PaymentMethod, PaymentStatus};
