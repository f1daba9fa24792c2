use std::sync::Arc;

use async_trait::async_trait;
use common::{CartId, OrderId, ProductId, UserId};
use domain::{Cart, CartItem, CheckoutStatus, Order, OrderLine, ProductStock, StockError};

use crate::Result;

/// Persistence for carts and their items.
///
/// Every item operation is a single read-modify-write on the row keyed by
/// `(cart_id, product_id)`; no operation spans more than one item.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's active cart, if one exists.
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<Cart>>;

    /// Returns the user's active cart, creating an empty one when missing.
    async fn get_or_create_cart(&self, user_id: &UserId) -> Result<Cart>;

    /// Deletes the user's cart and all of its items.
    ///
    /// Returns the deleted cart, or None if the user had no cart.
    async fn delete_cart(&self, user_id: &UserId) -> Result<Option<Cart>>;

    /// Lists the items of a cart, oldest first.
    async fn list_items(&self, cart_id: CartId) -> Result<Vec<CartItem>>;

    /// Finds a single item by product.
    async fn find_item(&self, cart_id: CartId, product_id: &ProductId)
    -> Result<Option<CartItem>>;

    /// Inserts the item or replaces the one with the same `(cart_id, product_id)`.
    async fn upsert_item(&self, item: &CartItem) -> Result<()>;

    /// Deletes a single item. Returns false if it did not exist.
    async fn delete_item(&self, cart_id: CartId, product_id: &ProductId) -> Result<bool>;

    /// Deletes every item of a cart, keeping the cart header.
    ///
    /// Returns the number of deleted items.
    async fn clear_items(&self, cart_id: CartId) -> Result<u64>;
}

/// Persistence for order headers and order lines.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order header.
    async fn create_order(&self, order: &Order) -> Result<()>;

    /// Persists a new order line. The parent order must exist.
    async fn create_order_line(&self, line: &OrderLine) -> Result<()>;

    /// Records the checkout outcome of an order.
    async fn set_checkout_status(&self, order_id: OrderId, status: CheckoutStatus) -> Result<()>;

    /// Loads an order header.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Lists a user's orders, newest first.
    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>>;

    /// Lists the lines of an order.
    async fn list_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>>;
}

/// Result of an inventory decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Stock was reduced; carries the updated product.
    Applied(ProductStock),
    /// The idempotency key was already used; nothing changed.
    Replayed(ProductStock),
    /// No product with this id.
    NotFound,
    /// The decrement was refused and stock is unchanged.
    Rejected(StockError),
}

/// Persistence for the product stock counter.
///
/// Implementations must perform the stock check and the subtraction as one
/// atomic operation so that concurrent decrements never drive stock negative.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Loads a product.
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<ProductStock>>;

    /// Inserts or replaces a product record.
    async fn upsert_product(&self, product: &ProductStock) -> Result<()>;

    /// Atomically removes `quantity` units if at least that many remain.
    ///
    /// When `idempotency_key` is given and was seen before for the same
    /// product and quantity, the stored stock is returned unchanged as
    /// [`DecrementOutcome::Replayed`]. Reusing a key for a different request
    /// fails with [`crate::StoreError::Conflict`].
    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
    ) -> Result<DecrementOutcome>;
}

#[async_trait]
impl<T: CartStore + ?Sized> CartStore for Arc<T> {
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<Cart>> {
        (**self).get_cart(user_id).await
    }

    async fn get_or_create_cart(&self, user_id: &UserId) -> Result<Cart> {
        (**self).get_or_create_cart(user_id).await
    }

    async fn delete_cart(&self, user_id: &UserId) -> Result<Option<Cart>> {
        (**self).delete_cart(user_id).await
    }

    async fn list_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        (**self).list_items(cart_id).await
    }

    async fn find_item(
        &self,
        cart_id: CartId,
        product_id: &ProductId,
    ) -> Result<Option<CartItem>> {
        (**self).find_item(cart_id, product_id).await
    }

    async fn upsert_item(&self, item: &CartItem) -> Result<()> {
        (**self).upsert_item(item).await
    }

    async fn delete_item(&self, cart_id: CartId, product_id: &ProductId) -> Result<bool> {
        (**self).delete_item(cart_id, product_id).await
    }

    async fn clear_items(&self, cart_id: CartId) -> Result<u64> {
        (**self).clear_items(cart_id).await
    }
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn create_order(&self, order: &Order) -> Result<()> {
        (**self).create_order(order).await
    }

    async fn create_order_line(&self, line: &OrderLine) -> Result<()> {
        (**self).create_order_line(line).await
    }

    async fn set_checkout_status(&self, order_id: OrderId, status: CheckoutStatus) -> Result<()> {
        (**self).set_checkout_status(order_id, status).await
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        (**self).get_order(order_id).await
    }

    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        (**self).list_orders_for_user(user_id).await
    }

    async fn list_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        (**self).list_lines(order_id).await
    }
}

#[async_trait]
impl<T: InventoryStore + ?Sized> InventoryStore for Arc<T> {
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<ProductStock>> {
        (**self).get_product(product_id).await
    }

    async fn upsert_product(&self, product: &ProductStock) -> Result<()> {
        (**self).upsert_product(product).await
    }

    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
    ) -> Result<DecrementOutcome> {
        (**self)
            .decrement(product_id, quantity, idempotency_key)
            .await
    }
}
