//! Order header, order lines and read-side summaries.

use chrono::{DateTime, Duration, Utc};
use common::{Money, OrderId, OrderLineId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::request::{CheckoutDetails, DeliveryAddress};
use super::status::{CheckoutStatus, DeliveryStatus, PaymentMethod, PaymentStatus};
use crate::cart::CartItem;

/// Promised delivery is placement time plus this many days.
pub const DELIVERY_WINDOW_DAYS: i64 = 7;

/// The committed header of a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub delivery_address: DeliveryAddress,
    pub phone_number: String,
    pub payment_method: PaymentMethod,
    pub payment_transaction_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub checkout_status: CheckoutStatus,
    #[serde(rename = "orderPlacedTime")]
    pub placed_at: DateTime<Utc>,
    pub delivery_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds a new draft order header from validated checkout input.
    pub fn place(user_id: UserId, details: CheckoutDetails, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            delivery_address: details.delivery_address,
            phone_number: details.phone_number,
            payment_method: details.payment_method,
            payment_transaction_id: details.payment_transaction_id,
            payment_status: PaymentStatus::Pending,
            delivery_status: DeliveryStatus::Pending,
            checkout_status: CheckoutStatus::Draft,
            placed_at: now,
            delivery_time: now + Duration::days(DELIVERY_WINDOW_DAYS),
            created_at: now,
        }
    }

    /// Returns true if the order belongs to `user_id`.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Returns true if the order is visible to its owner.
    pub fn is_confirmed(&self) -> bool {
        self.checkout_status == CheckoutStatus::Confirmed
    }
}

/// One itemized line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub price: Money,
    pub quantity: u32,
}

impl OrderLine {
    /// Creates the order line for a reserved cart item, carrying its price snapshot.
    pub fn from_cart_item(order_id: OrderId, item: &CartItem) -> Self {
        Self {
            id: OrderLineId::new(),
            order_id,
            product_id: item.product_id.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }

    /// Price multiplied by quantity.
    pub fn amount(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// Sum of `price × quantity` over the lines; the authoritative order total.
pub fn order_total(lines: &[OrderLine]) -> Money {
    lines.iter().map(OrderLine::amount).sum()
}

/// Sum of quantities over the lines.
pub fn total_items(lines: &[OrderLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}

/// Listing view of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_placed_time: DateTime<Utc>,
    pub delivery_time: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub total_items: u64,
    pub total_amount: Money,
}

impl OrderSummary {
    /// Summarizes an order from its persisted lines.
    pub fn from_lines(order: &Order, lines: &[OrderLine]) -> Self {
        Self {
            id: order.id,
            order_placed_time: order.placed_at,
            delivery_time: order.delivery_time,
            payment_status: order.payment_status,
            delivery_status: order.delivery_status,
            total_items: total_items(lines),
            total_amount: order_total(lines),
        }
    }
}
