//! Order service entry point.

use std::sync::Arc;

use api::config::{Config, ORDER_SERVICE_PORT};
use api::state::OrderAppState;

#[tokio::main]
async fn main() {
    let config = Config::from_env(ORDER_SERVICE_PORT);
    api::server::init_tracing(&config);

    let metrics_handle = api::server::init_metrics().expect("failed to install Prometheus recorder");

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }
    tracing::info!(
        product_service = %config.gateway.product_service_url,
        "product gateway configured"
    );

    let state = OrderAppState::from_config(&config)
        .await
        .expect("failed to initialize order service");
    let app = api::create_order_app(Arc::new(state), metrics_handle);

    api::server::serve(app, &config, "order-service")
        .await
        .expect("server error");
}
