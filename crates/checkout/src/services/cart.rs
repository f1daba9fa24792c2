//! Cart operations for the order service.

use chrono::Utc;
use common::{ProductId, UserId};
use domain::{CartItem, QuantityChange, ValidationError};
use store::CartStore;

use crate::error::{CartError, GatewayError};
use crate::gateway::ProductGateway;

/// Edits a user's active cart one item at a time.
pub struct CartService<C, G> {
    carts: C,
    products: G,
}

impl<C, G> CartService<C, G>
where
    C: CartStore,
    G: ProductGateway,
{
    pub fn new(carts: C, products: G) -> Self {
        Self { carts, products }
    }

    /// Adds `quantity` units of a product, creating the cart and the item as
    /// needed.
    ///
    /// A new item snapshots the product's current price and must meet its
    /// minimum order size. An existing item keeps its price and grows by
    /// `quantity`.
    #[tracing::instrument(skip(self))]
    pub async fn add_or_update_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartItem, CartError> {
        if product_id.is_blank() {
            return Err(ValidationError::MissingProductId.into());
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(ValidationError::InvalidQuantity(quantity))?;

        let product = self
            .products
            .get_product(product_id)
            .await
            .map_err(|e| match e {
                GatewayError::NotFound(_) => CartError::ProductNotFound,
                other => CartError::Gateway(other),
            })?;

        let cart = self.carts.get_or_create_cart(user_id).await?;
        let item = match self.carts.find_item(cart.id, product_id).await? {
            Some(mut existing) => {
                existing.increase(quantity)?;
                existing
            }
            None => CartItem::new(
                cart.id,
                product_id.clone(),
                product.price,
                quantity,
                product.minimum_order_size,
                Utc::now(),
            )?,
        };

        self.carts.upsert_item(&item).await?;
        tracing::debug!(cart_id = %cart.id, quantity = item.quantity, "cart item saved");
        Ok(item)
    }

    /// Adds one unit to an existing item.
    #[tracing::instrument(skip(self))]
    pub async fn increase(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<CartItem, CartError> {
        let mut item = self.existing_item(user_id, product_id).await?;
        item.increase(1)?;
        self.carts.upsert_item(&item).await?;
        Ok(item)
    }

    /// Removes one unit, deleting the item when its quantity reaches zero.
    ///
    /// Returns the updated item, or None if it was removed.
    #[tracing::instrument(skip(self))]
    pub async fn decrease(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<CartItem>, CartError> {
        let mut item = self.existing_item(user_id, product_id).await?;
        match item.decrease() {
            QuantityChange::Updated(_) => {
                self.carts.upsert_item(&item).await?;
                Ok(Some(item))
            }
            QuantityChange::Removed => {
                self.carts.delete_item(item.cart_id, product_id).await?;
                Ok(None)
            }
        }
    }

    /// Deletes an item regardless of its quantity.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, user_id: &UserId, product_id: &ProductId) -> Result<(), CartError> {
        let cart = self
            .carts
            .get_cart(user_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        if !self.carts.delete_item(cart.id, product_id).await? {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }

    /// Lists the items in the user's cart. A user without a cart has none.
    pub async fn list_items(&self, user_id: &UserId) -> Result<Vec<CartItem>, CartError> {
        match self.carts.get_cart(user_id).await? {
            Some(cart) => Ok(self.carts.list_items(cart.id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Deletes the cart together with its items.
    #[tracing::instrument(skip(self))]
    pub async fn delete_cart(&self, user_id: &UserId) -> Result<(), CartError> {
        self.carts
            .delete_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;
        tracing::info!("cart deleted");
        Ok(())
    }

    async fn existing_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<CartItem, CartError> {
        if product_id.is_blank() {
            return Err(ValidationError::MissingProductId.into());
        }
        let cart = self
            .carts
            .get_cart(user_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        self.carts
            .find_item(cart.id, product_id)
            .await?
            .ok_or(CartError::ItemNotFound)
    }
}
