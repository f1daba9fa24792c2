//! Checkout and order history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::OrderDetails;
use common::{OrderId, UserId};
use domain::{CheckoutRequest, Order, OrderLine, OrderSummary};
use serde::Serialize;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::OrderAppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order: Order,
    pub order_lines: Vec<OrderLine>,
}

/// POST /api/orders/checkout: turn the caller's cart into an order.
#[tracing::instrument(skip(state, caller, req), fields(user_id = %caller.user_id))]
pub async fn checkout(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let receipt = state
        .checkout
        .checkout(&caller.user_id, &req, &caller.credential)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Order created successfully.",
            order: receipt.order,
            order_lines: receipt.lines,
        }),
    ))
}

/// GET /api/orders/user/{userId}: order history of the caller.
#[tracing::instrument(skip(state, caller))]
pub async fn list_for_user(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let summaries = state
        .orders
        .list_for_user(&caller.user_id, &UserId::new(user_id))
        .await?;
    Ok(Json(summaries))
}

/// GET /api/orders/{orderId}: one of the caller's orders with its lines.
#[tracing::instrument(skip(state, caller))]
pub async fn get(
    State(state): State<Arc<OrderAppState>>,
    caller: Caller,
    Path(order_id): Path<String>,
) -> Result<Json<OrderDetails>, ApiError> {
    let order_id = uuid::Uuid::parse_str(&order_id)
        .map(OrderId::from_uuid)
        .map_err(|_| ApiError::NotFound("Order not found.".to_string()))?;

    let details = state.orders.get_for_user(&caller.user_id, order_id).await?;
    Ok(Json(details))
}
