use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartId, OrderId, ProductId, UserId};
use domain::{Cart, CartItem, CheckoutStatus, Order, OrderLine, ProductStock};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{CartStore, DecrementOutcome, InventoryStore, OrderStore},
};

#[derive(Debug, Default)]
struct CartState {
    carts: HashMap<UserId, Cart>,
    items: HashMap<CartId, Vec<CartItem>>,
    unavailable: bool,
}

impl CartState {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(StoreError::Unavailable("cart store offline".to_string()));
        }
        Ok(())
    }
}

/// In-memory cart store for testing.
///
/// Carts are keyed by user, which enforces one active cart per user.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    state: Arc<RwLock<CartState>>,
}

impl InMemoryCartStore {
    /// Creates a new empty cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Returns the number of carts held.
    pub async fn cart_count(&self) -> usize {
        self.state.read().await.carts.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<Cart>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.carts.get(user_id).cloned())
    }

    async fn get_or_create_cart(&self, user_id: &UserId) -> Result<Cart> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let cart = state
            .carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::new(user_id.clone(), Utc::now()))
            .clone();
        Ok(cart)
    }

    async fn delete_cart(&self, user_id: &UserId) -> Result<Option<Cart>> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let cart = state.carts.remove(user_id);
        if let Some(ref cart) = cart {
            state.items.remove(&cart.id);
        }
        Ok(cart)
    }

    async fn list_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.items.get(&cart_id).cloned().unwrap_or_default())
    }

    async fn find_item(
        &self,
        cart_id: CartId,
        product_id: &ProductId,
    ) -> Result<Option<CartItem>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state
            .items
            .get(&cart_id)
            .and_then(|items| items.iter().find(|i| &i.product_id == product_id))
            .cloned())
    }

    async fn upsert_item(&self, item: &CartItem) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let items = state.items.entry(item.cart_id).or_default();
        match items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(())
    }

    async fn delete_item(&self, cart_id: CartId, product_id: &ProductId) -> Result<bool> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let Some(items) = state.items.get_mut(&cart_id) else {
            return Ok(false);
        };
        let before = items.len();
        items.retain(|i| &i.product_id != product_id);
        Ok(items.len() != before)
    }

    async fn clear_items(&self, cart_id: CartId) -> Result<u64> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let removed = state.items.remove(&cart_id).map(|i| i.len()).unwrap_or(0);
        Ok(removed as u64)
    }
}

#[derive(Debug, Default)]
struct OrderState {
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
    fail_on_line_write: bool,
}

/// In-memory order store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<OrderState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail every order line write.
    pub async fn set_fail_on_line_write(&self, fail: bool) {
        self.state.write().await.fail_on_line_write = fail;
    }

    /// Returns the number of order headers stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of order lines stored.
    pub async fn line_count(&self) -> usize {
        self.state.read().await.lines.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        if state.orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        state.orders.push(order.clone());
        Ok(())
    }

    async fn create_order_line(&self, line: &OrderLine) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_line_write {
            return Err(StoreError::Unavailable("order line write failed".to_string()));
        }
        if !state.orders.iter().any(|o| o.id == line.order_id) {
            return Err(StoreError::NotFound {
                entity: "order",
                id: line.order_id.to_string(),
            });
        }
        state.lines.push(line.clone());
        Ok(())
    }

    async fn set_checkout_status(&self, order_id: OrderId, status: CheckoutStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })?;
        order.checkout_status = status;
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .iter()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }

    async fn list_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let state = self.state.read().await;
        Ok(state
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
struct InventoryState {
    products: HashMap<ProductId, ProductStock>,
    applied_keys: HashMap<String, (ProductId, u32)>,
}

/// In-memory inventory store for testing.
///
/// The check and the subtraction of a decrement run under one write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    state: Arc<RwLock<InventoryState>>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty inventory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given products.
    pub fn with_products(products: impl IntoIterator<Item = ProductStock>) -> Self {
        let state = InventoryState {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            applied_keys: HashMap::new(),
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Returns the current stock of a product.
    pub async fn stock_of(&self, product_id: &ProductId) -> Option<u32> {
        self.state
            .read()
            .await
            .products
            .get(product_id)
            .map(|p| p.stock)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<ProductStock>> {
        Ok(self.state.read().await.products.get(product_id).cloned())
    }

    async fn upsert_product(&self, product: &ProductStock) -> Result<()> {
        self.state
            .write()
            .await
            .products
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
    ) -> Result<DecrementOutcome> {
        let mut state = self.state.write().await;

        if let Some(key) = idempotency_key
            && let Some((seen_product, seen_quantity)) = state.applied_keys.get(key)
        {
            if seen_product != product_id || *seen_quantity != quantity {
                return Err(StoreError::Conflict(format!(
                    "idempotency key {key} was used for a different decrement"
                )));
            }
            let product = state.products.get(product_id).cloned().ok_or_else(|| {
                StoreError::NotFound {
                    entity: "product",
                    id: product_id.to_string(),
                }
            })?;
            return Ok(DecrementOutcome::Replayed(product));
        }

        let Some(product) = state.products.get_mut(product_id) else {
            return Ok(DecrementOutcome::NotFound);
        };

        if let Err(e) = product.decrement(quantity, Utc::now()) {
            return Ok(DecrementOutcome::Rejected(e));
        }
        let updated = product.clone();

        if let Some(key) = idempotency_key {
            state
                .applied_keys
                .insert(key.to_string(), (product_id.clone(), quantity));
        }

        Ok(DecrementOutcome::Applied(updated))
    }
}
