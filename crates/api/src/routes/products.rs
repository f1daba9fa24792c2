//! Product service endpoints: stock reads and the decrement.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use checkout::{DecrementAck, IDEMPOTENCY_KEY_HEADER, InventoryError};
use common::ProductId;
use domain::ProductStock;
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::ProductAppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecrementRequest {
    pub product_id: Option<String>,
    /// Kept loose so fractional or non-numeric values get the endpoint's own 400.
    pub quantity: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct DecrementResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub ack: DecrementAck,
}

/// GET /api/products/{id}: current stock of a product.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<ProductAppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductStock>, ApiError> {
    let product = state.inventory.get_product(&ProductId::new(id)).await?;
    Ok(Json(product))
}

/// POST /api/products/decrement: remove units from stock.
///
/// An `Idempotency-Key` header makes repeated calls with the same key
/// return the first acknowledgement without decrementing again.
#[tracing::instrument(skip(state, caller, headers), fields(user_id = %caller.user_id))]
pub async fn decrement(
    State(state): State<Arc<ProductAppState>>,
    caller: Caller,
    headers: HeaderMap,
    Json(req): Json<DecrementRequest>,
) -> Result<Json<DecrementResponse>, ApiError> {
    let product_id = req
        .product_id
        .map(ProductId::new)
        .ok_or(InventoryError::InvalidRequest)?;
    let quantity = req
        .quantity
        .as_ref()
        .and_then(serde_json::Value::as_i64)
        .ok_or(InventoryError::InvalidRequest)?;
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|k| !k.is_empty());

    let ack = state
        .inventory
        .decrement(&product_id, quantity, idempotency_key)
        .await?;

    Ok(Json(DecrementResponse {
        message: "Product inventory updated successfully.",
        ack,
    }))
}
