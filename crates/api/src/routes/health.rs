//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health for the order service.
pub async fn order_service() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "order-service",
    })
}

/// GET /health for the product service.
pub async fn product_service() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "product-service",
    })
}
