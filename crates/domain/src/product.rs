//! Product stock counter and availability status.

use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;

/// Stock at or below this level (and above zero) is reported as low.
pub const LOW_STOCK_THRESHOLD: u32 = 15;

/// Human-readable availability derived from the stock counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    Available,
}

impl AvailabilityStatus {
    /// Derives the status for a stock level.
    pub fn for_stock(stock: u32) -> Self {
        match stock {
            0 => AvailabilityStatus::OutOfStock,
            s if s <= LOW_STOCK_THRESHOLD => AvailabilityStatus::LowStock,
            _ => AvailabilityStatus::Available,
        }
    }

    /// Returns the status as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::OutOfStock => "Out of Stock",
            AvailabilityStatus::LowStock => "Low Stock",
            AvailabilityStatus::Available => "Available",
        }
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AvailabilityStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Out of Stock" => Ok(AvailabilityStatus::OutOfStock),
            "Low Stock" => Ok(AvailabilityStatus::LowStock),
            "Available" => Ok(AvailabilityStatus::Available),
            other => Err(DomainError::UnknownVariant {
                kind: "availability status",
                value: other.to_string(),
            }),
        }
    }
}

/// Rejected stock mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Decrement quantity must be positive.
    #[error("Invalid quantity: {0} (must be greater than 0)")]
    InvalidQuantity(u32),

    /// Not enough units left to satisfy the decrement.
    #[error("Not enough stock available: requested {requested}, available {available}")]
    Insufficient { requested: u32, available: u32 },
}

/// The inventory view of a product: the single source of truth for stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStock {
    pub id: ProductId,
    pub title: String,
    pub price: Money,
    pub stock: u32,
    pub availability_status: AvailabilityStatus,
    pub minimum_order_size: u32,
    pub seller_id: String,
    pub updated_at: DateTime<Utc>,
}

impl ProductStock {
    /// Creates a product record with its availability derived from `stock`.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        price: Money,
        stock: u32,
        seller_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            stock,
            availability_status: AvailabilityStatus::for_stock(stock),
            minimum_order_size: 1,
            seller_id: seller_id.into(),
            updated_at: Utc::now(),
        }
    }

    /// Sets the minimum order size (at least one).
    pub fn with_minimum_order_size(mut self, minimum: u32) -> Self {
        self.minimum_order_size = minimum.max(1);
        self
    }

    /// Removes `quantity` units, keeping stock non-negative and the
    /// availability status in step with the new level.
    pub fn decrement(&mut self, quantity: u32, now: DateTime<Utc>) -> Result<(), StockError> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }
        if self.stock < quantity {
            return Err(StockError::Insufficient {
                requested: quantity,
                available: self.stock,
            });
        }
        self.stock -= quantity;
        self.availability_status = AvailabilityStatus::for_stock(self.stock);
        self.updated_at = now;
        Ok(())
    }
}
