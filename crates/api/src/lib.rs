//! HTTP surface of the marketplace: the order service (carts, checkout,
//! order history) and the product service (stock reads and decrements),
//! with JWT caller authentication, structured logging and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::{OrderAppState, ProductAppState};

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(handle)
}

fn with_layers(router: Router) -> Router {
    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the order service router.
pub fn create_order_app(state: Arc<OrderAppState>, metrics_handle: PrometheusHandle) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health::order_service))
        .route("/api/orders/checkout", post(routes::orders::checkout))
        .route("/api/orders/user/{user_id}", get(routes::orders::list_for_user))
        .route("/api/orders/{order_id}", get(routes::orders::get))
        .route(
            "/api/carts/items",
            post(routes::carts::add_item).get(routes::carts::list_items),
        )
        .route("/api/carts/items/increase", post(routes::carts::increase))
        .route("/api/carts/items/decrease", post(routes::carts::decrease))
        .route("/api/carts/items/remove", post(routes::carts::remove))
        .route("/api/carts", delete(routes::carts::delete_cart))
        .with_state(state)
        .merge(metrics_router(metrics_handle));

    with_layers(router)
}

/// Creates the product service router.
pub fn create_product_app(
    state: Arc<ProductAppState>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health::product_service))
        .route("/api/products/decrement", post(routes::products::decrement))
        .route("/api/products/{id}", get(routes::products::get))
        .with_state(state)
        .merge(metrics_router(metrics_handle));

    with_layers(router)
}
