//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CartError, CheckoutError, InventoryError, OrderQueryError};

/// API-level error type that maps to HTTP responses.
///
/// The body is always `{"error": ...}`; a partially failed checkout carries
/// one message per failed product.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credential.
    Unauthorized(&'static str),
    /// The caller may not access the resource.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The request conflicts with earlier state.
    Conflict(String),
    /// Checkout lines that failed.
    PartialFailure(Vec<String>),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, serde_json::json!(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, serde_json::json!(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, serde_json::json!(msg)),
            ApiError::PartialFailure(messages) => {
                (StatusCode::BAD_REQUEST, serde_json::json!(messages))
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!(msg))
            }
        };

        let body = serde_json::json!({ "error": body });
        (status, axum::Json(body)).into_response()
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::PartialFailure { messages, .. } => ApiError::PartialFailure(messages),
            CheckoutError::Validation(_) | CheckoutError::NoCart | CheckoutError::EmptyCart => {
                ApiError::BadRequest(err.to_string())
            }
            CheckoutError::Store(_) | CheckoutError::Unexpected(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Validation(_) => ApiError::BadRequest(err.to_string()),
            CartError::CartNotFound | CartError::ItemNotFound | CartError::ProductNotFound => {
                ApiError::NotFound(err.to_string())
            }
            CartError::Gateway(_) | CartError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<OrderQueryError> for ApiError {
    fn from(err: OrderQueryError) -> Self {
        match err {
            OrderQueryError::NotFound => ApiError::NotFound(err.to_string()),
            OrderQueryError::Forbidden => ApiError::Forbidden(err.to_string()),
            OrderQueryError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InvalidRequest | InventoryError::InsufficientStock { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            InventoryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            InventoryError::KeyReused(_) => ApiError::Conflict(err.to_string()),
            InventoryError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}
