//! Error types for the checkout services.

use common::{OrderId, ProductId};
use domain::ValidationError;
use store::StoreError;
use thiserror::Error;

/// Body text the product service uses for an insufficient-stock rejection.
pub const INSUFFICIENT_STOCK_MESSAGE: &str = "Not enough stock available.";

/// Errors returned by the inventory decrement endpoint.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Product id blank or quantity not a positive integer.
    #[error("Invalid productId or quantity.")]
    InvalidRequest,

    /// No product with this id.
    #[error("Product not found.")]
    NotFound(ProductId),

    /// Fewer units in stock than requested.
    #[error("{}", INSUFFICIENT_STOCK_MESSAGE)]
    InsufficientStock { requested: u32, available: u32 },

    /// The idempotency key was already used for another decrement.
    #[error("Idempotency key reused: {0}")]
    KeyReused(String),

    /// Store error.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for InventoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::KeyReused(msg),
            other => Self::Store(other),
        }
    }
}

/// Errors from the Product Availability Gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The product service has no such product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The decrement was refused for lack of stock.
    #[error("Not enough stock for product {0}")]
    InsufficientStock(ProductId),

    /// The request was refused for another reason.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The forwarded credential was refused.
    #[error("Unauthorized")]
    Unauthorized,

    /// The call did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection or protocol failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The product service answered with a server error.
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The product service is unreachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Returns true for failures that may succeed when the call is repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) | Self::Unavailable(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The user has no active cart.
    #[error("Cart not found.")]
    CartNotFound,

    /// The cart holds no item for this product.
    #[error("Item not found in cart.")]
    ItemNotFound,

    /// The product does not exist.
    #[error("Product not found.")]
    ProductNotFound,

    /// The product lookup failed.
    #[error("Product lookup failed: {0}")]
    Gateway(#[from] GatewayError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from order reads.
#[derive(Debug, Error)]
pub enum OrderQueryError {
    /// No confirmed order with this id.
    #[error("Order not found.")]
    NotFound,

    /// The caller does not own the requested orders.
    #[error("Not authorized to view this order.")]
    Forbidden,

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the checkout coordinator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The checkout request was incomplete.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The user has no active cart.
    #[error("No active cart found for this user.")]
    NoCart,

    /// The user's cart has no items.
    #[error("Cart is empty. Cannot proceed with checkout.")]
    EmptyCart,

    /// At least one line failed; the order is marked failed and the cart kept.
    #[error("Checkout of order {order_id} failed: {}", .messages.join(" "))]
    PartialFailure {
        order_id: OrderId,
        messages: Vec<String>,
    },

    /// Store error before any line was processed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The lines were processed but the outcome could not be recorded.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
