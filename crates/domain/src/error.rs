//! Domain error types.

use thiserror::Error;

use crate::product::StockError;

/// Input rejected before any state is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One of payment method, delivery address or phone number is missing.
    #[error("Payment method, delivery address, and phone number are required.")]
    MissingCheckoutFields,

    /// The delivery address has a blank field.
    #[error("Delivery address requires street, city, postal code, and country.")]
    IncompleteAddress,

    /// The payment method is not one of the accepted values.
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// Non cash payments must carry the provider's transaction id.
    #[error("Payment transaction id is required unless paying cash on delivery.")]
    MissingTransactionId,

    /// A product id is required for cart operations.
    #[error("Missing productId.")]
    MissingProductId,

    /// Quantity must be positive.
    #[error("Invalid quantity: {0} (must be greater than 0)")]
    InvalidQuantity(i64),

    /// A new cart item is below the product's minimum order size.
    #[error("Minimum order quantity for this product is {minimum}.")]
    BelowMinimumOrder { minimum: u32 },
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A stock mutation was rejected.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// A stored status string did not match any known variant.
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
