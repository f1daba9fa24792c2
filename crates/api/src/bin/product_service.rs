//! Product service entry point.

use std::sync::Arc;

use api::config::{Config, PRODUCT_SERVICE_PORT};
use api::state::ProductAppState;

#[tokio::main]
async fn main() {
    let config = Config::from_env(PRODUCT_SERVICE_PORT);
    api::server::init_tracing(&config);

    let metrics_handle = api::server::init_metrics().expect("failed to install Prometheus recorder");

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    let state = ProductAppState::from_config(&config)
        .await
        .expect("failed to initialize product service");
    let app = api::create_product_app(Arc::new(state), metrics_handle);

    api::server::serve(app, &config, "product-service")
        .await
        .expect("server error");
}
