//! Cart endpoints. Every route acts on the caller's own cart.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::ProductId;
use domain::CartItem;
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::OrderAppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub product_id: Option<String>,
}

impl ItemRequest {
    fn product_id(&self) -> ProductId {
        ProductId::new(self.product_id.clone().unwrap_or_default())
    }
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub message: &'static str,
    pub item: Option<CartItem>,
}

/// POST /api/carts/items: add a product or grow its quantity.
#[tracing::instrument(skip(state, caller), fields(user_id = %caller.user_id))]
pub async fn add_item(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartItem>, ApiError> {
    let product_id = ProductId::new(req.product_id.unwrap_or_default());
    let item = state
        .carts
        .add_or_update_item(&caller.user_id, &product_id, req.quantity.unwrap_or(0))
        .await?;
    Ok(Json(item))
}

/// POST /api/carts/items/increase: add one unit.
pub async fn increase(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
    Json(req): Json<ItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = state
        .carts
        .increase(&caller.user_id, &req.product_id())
        .await?;
    Ok(Json(ItemResponse {
        message: "Item quantity increased.",
        item: Some(item),
    }))
}

/// POST /api/carts/items/decrease: remove one unit, dropping the item at zero.
pub async fn decrease(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
    Json(req): Json<ItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = state
        .carts
        .decrease(&caller.user_id, &req.product_id())
        .await?;
    let message = match item {
        Some(_) => "Item quantity decreased.",
        None => "Item removed from cart.",
    };
    Ok(Json(ItemResponse { message, item }))
}

/// POST /api/carts/items/remove: drop an item.
pub async fn remove(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
    Json(req): Json<ItemRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .carts
        .remove(&caller.user_id, &req.product_id())
        .await?;
    Ok(Json(MessageResponse {
        message: "Item removed from cart.",
    }))
}

/// GET /api/carts/items: the caller's cart items.
pub async fn list_items(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
) -> Result<Json<Vec<CartItem>>, ApiError> {
    Ok(Json(state.carts.list_items(&caller.user_id).await?))
}

/// DELETE /api/carts: delete the cart and all its items.
pub async fn delete_cart(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
) -> Result<Json<MessageResponse>, ApiError> {
    state.carts.delete_cart(&caller.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Cart and items deleted successfully.",
    }))
}
