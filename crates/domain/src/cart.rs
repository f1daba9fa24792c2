//! Cart and cart item rules.

use chrono::{DateTime, Utc};
use common::{CartId, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lifecycle marker of a cart. Only one active cart exists per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    #[default]
    Active,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "active",
        }
    }
}

/// A user's pending selection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new active cart for a user.
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: CartId::new(),
            user_id,
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome of decrementing a cart item by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The item stays in the cart with the new quantity.
    Updated(u32),
    /// The quantity would reach zero; the item must be removed.
    Removed,
}

/// Largest quantity a cart item may hold; stored as a 32-bit signed integer.
pub const MAX_ITEM_QUANTITY: u32 = i32::MAX as u32;

/// One product line in a cart, keyed by `(cart_id, product_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_id: CartId,
    pub product_id: ProductId,
    /// Unit price captured when the product was first added.
    pub price: Money,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item, enforcing a positive quantity that meets the
    /// product's minimum order size.
    pub fn new(
        cart_id: CartId,
        product_id: ProductId,
        price: Money,
        quantity: u32,
        minimum_order_size: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if quantity == 0 || quantity > MAX_ITEM_QUANTITY {
            return Err(ValidationError::InvalidQuantity(i64::from(quantity)));
        }
        if quantity < minimum_order_size {
            return Err(ValidationError::BelowMinimumOrder {
                minimum: minimum_order_size,
            });
        }
        Ok(Self {
            cart_id,
            product_id,
            price,
            quantity,
            created_at: now,
        })
    }

    /// Adds `by` units. The snapshotted price is kept.
    pub fn increase(&mut self, by: u32) -> Result<(), ValidationError> {
        let total = i64::from(self.quantity) + i64::from(by);
        if by == 0 || total > i64::from(MAX_ITEM_QUANTITY) {
            return Err(ValidationError::InvalidQuantity(i64::from(by)));
        }
        self.quantity += by;
        Ok(())
    }

    /// Removes one unit, reporting removal when the quantity would reach zero.
    pub fn decrease(&mut self) -> QuantityChange {
        if self.quantity > 1 {
            self.quantity -= 1;
            QuantityChange::Updated(self.quantity)
        } else {
            QuantityChange::Removed
        }
    }

    /// Price multiplied by quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}
