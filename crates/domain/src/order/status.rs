//! Order status enums.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Implements `as_str`, `Display` and `FromStr` over the stored names.
macro_rules! stored_names {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the name as stored and displayed.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err(DomainError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

stored_names!(PaymentMethod, "payment method", {
    CreditCard => "Credit Card",
    DebitCard => "Debit Card",
    Upi => "UPI",
    CashOnDelivery => "Cash on Delivery",
});

impl PaymentMethod {
    /// Returns true if the method settles through a payment provider and
    /// therefore carries a transaction id.
    pub fn requires_transaction_id(&self) -> bool {
        !matches!(self, PaymentMethod::CashOnDelivery)
    }
}

/// Payment progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

stored_names!(PaymentStatus, "payment status", {
    Pending => "Pending",
    Completed => "Completed",
    Failed => "Failed",
    Refunded => "Refunded",
});

/// Delivery progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

stored_names!(DeliveryStatus, "delivery status", {
    Pending => "Pending",
    Shipped => "Shipped",
    OutForDelivery => "Out for Delivery",
    Delivered => "Delivered",
    Cancelled => "Cancelled",
});

/// Outcome of the checkout that created an order.
///
/// State transitions:
/// ```text
/// Draft ──┬──► Confirmed
///         └──► Failed
/// ```
/// Only confirmed orders are visible to their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStatus {
    /// Header persisted, lines still being processed.
    #[default]
    Draft,
    /// Every line was reserved and the cart was cleared (terminal state).
    Confirmed,
    /// At least one line failed; side effects may remain (terminal state).
    Failed,
}

stored_names!(CheckoutStatus, "checkout status", {
    Draft => "Draft",
    Confirmed => "Confirmed",
    Failed => "Failed",
});

impl CheckoutStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStatus::Confirmed | CheckoutStatus::Failed)
    }
}
