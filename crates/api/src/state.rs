//! Shared application state for the two services.

use std::sync::Arc;

use axum::extract::FromRef;
use checkout::{
    CartService, CheckoutCoordinator, HttpProductGateway, InProcessProductGateway,
    InventoryService, OrderQueries, ProductGateway,
};
use sqlx::postgres::PgPoolOptions;
use store::{
    CartStore, InMemoryCartStore, InMemoryInventoryStore, InMemoryOrderStore, InventoryStore,
    OrderStore, PgCartStore, PgInventoryStore, PgOrderStore,
};
use thiserror::Error;

use crate::auth::JwtKeys;
use crate::config::Config;

pub type DynCartStore = Arc<dyn CartStore>;
pub type DynOrderStore = Arc<dyn OrderStore>;
pub type DynInventoryStore = Arc<dyn InventoryStore>;
pub type DynProductGateway = Arc<dyn ProductGateway>;

/// Errors that prevent a service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Store(#[from] store::StoreError),

    #[error("Product gateway setup failed: {0}")]
    Gateway(#[from] checkout::GatewayError),
}

/// State of the order service.
pub struct OrderAppState {
    pub checkout: CheckoutCoordinator<DynCartStore, DynOrderStore, DynProductGateway>,
    pub carts: CartService<DynCartStore, DynProductGateway>,
    pub orders: OrderQueries<DynOrderStore>,
    pub keys: JwtKeys,
}

impl OrderAppState {
    pub fn new(
        carts: DynCartStore,
        orders: DynOrderStore,
        products: DynProductGateway,
        keys: JwtKeys,
    ) -> Self {
        Self {
            checkout: CheckoutCoordinator::new(carts.clone(), orders.clone(), products.clone()),
            carts: CartService::new(carts, products),
            orders: OrderQueries::new(orders),
            keys,
        }
    }

    /// Builds the order service from configuration: PostgreSQL stores when
    /// `DATABASE_URL` is set, in-memory stores otherwise, and an HTTP
    /// gateway to the product service.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let gateway: DynProductGateway = Arc::new(HttpProductGateway::new(
            config.gateway.product_service_url.clone(),
            config.gateway.timeout,
            config.gateway.retry,
        )?);
        let keys = JwtKeys::new(&config.jwt_secret);

        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
                store::run_migrations(&pool).await?;
                tracing::info!("using PostgreSQL stores");
                Ok(Self::new(
                    Arc::new(PgCartStore::new(pool.clone())),
                    Arc::new(PgOrderStore::new(pool)),
                    gateway,
                    keys,
                ))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory stores");
                Ok(Self::new(
                    Arc::new(InMemoryCartStore::new()),
                    Arc::new(InMemoryOrderStore::new()),
                    gateway,
                    keys,
                ))
            }
        }
    }

    /// Order service backed by in-memory stores and an in-process product
    /// service over `inventory`.
    pub fn in_memory(inventory: InMemoryInventoryStore, keys: JwtKeys) -> Self {
        let gateway = InProcessProductGateway::new(InventoryService::new(inventory));
        Self::new(
            Arc::new(InMemoryCartStore::new()),
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(gateway),
            keys,
        )
    }
}

impl FromRef<Arc<OrderAppState>> for JwtKeys {
    fn from_ref(state: &Arc<OrderAppState>) -> Self {
        state.keys.clone()
    }
}

/// State of the product service.
pub struct ProductAppState {
    pub inventory: InventoryService<DynInventoryStore>,
    pub keys: JwtKeys,
}

impl ProductAppState {
    pub fn new(store: DynInventoryStore, keys: JwtKeys) -> Self {
        Self {
            inventory: InventoryService::new(store),
            keys,
        }
    }

    /// Builds the product service from configuration.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let keys = JwtKeys::new(&config.jwt_secret);
        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
                store::run_migrations(&pool).await?;
                tracing::info!("using PostgreSQL inventory store");
                Ok(Self::new(Arc::new(PgInventoryStore::new(pool)), keys))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory inventory store");
                Ok(Self::new(Arc::new(InMemoryInventoryStore::new()), keys))
            }
        }
    }
}

impl FromRef<Arc<ProductAppState>> for JwtKeys {
    fn from_ref(state: &Arc<ProductAppState>) -> Self {
        state.keys.clone()
    }
}
