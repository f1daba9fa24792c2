use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use domain::ProductStock;
use store::InventoryStore;
use tokio::sync::RwLock;

use super::{CallerCredential, ProductGateway};
use crate::error::{GatewayError, InventoryError};
use crate::services::{DecrementAck, InventoryService};

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    fail_decrement_for: HashSet<ProductId>,
    decrement_calls: usize,
}

/// Gateway calling the inventory service in the same process.
///
/// Used by single-process deployments and tests. Faults can be injected to
/// simulate an unreachable product service.
#[derive(Debug, Clone)]
pub struct InProcessProductGateway<S> {
    inventory: InventoryService<S>,
    faults: Arc<RwLock<Faults>>,
}

impl<S: InventoryStore> InProcessProductGateway<S> {
    pub fn new(inventory: InventoryService<S>) -> Self {
        Self {
            inventory,
            faults: Arc::default(),
        }
    }

    pub fn inventory(&self) -> &InventoryService<S> {
        &self.inventory
    }

    /// Makes every call fail with [`GatewayError::Unavailable`].
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.faults.write().await.unavailable = unavailable;
    }

    /// Makes decrements of `product_id` fail with a transient error.
    pub async fn fail_decrement_for(&self, product_id: impl Into<ProductId>) {
        self.faults
            .write()
            .await
            .fail_decrement_for
            .insert(product_id.into());
    }

    /// Returns the number of decrement calls received.
    pub async fn decrement_calls(&self) -> usize {
        self.faults.read().await.decrement_calls
    }
}

impl From<InventoryError> for GatewayError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(id) => Self::NotFound(id),
            InventoryError::Store(e) => Self::Unavailable(e.to_string()),
            other => Self::Rejected(other.to_string()),
        }
    }
}

#[async_trait]
impl<S: InventoryStore> ProductGateway for InProcessProductGateway<S> {
    async fn get_product(&self, product_id: &ProductId) -> Result<ProductStock, GatewayError> {
        if self.faults.read().await.unavailable {
            return Err(GatewayError::Unavailable("product service offline".to_string()));
        }
        Ok(self.inventory.get_product(product_id).await?)
    }

    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
        _credential: &CallerCredential,
    ) -> Result<DecrementAck, GatewayError> {
        {
            let mut faults = self.faults.write().await;
            faults.decrement_calls += 1;
            if faults.unavailable {
                return Err(GatewayError::Unavailable("product service offline".to_string()));
            }
            if faults.fail_decrement_for.contains(product_id) {
                return Err(GatewayError::Transport(format!(
                    "connection reset while decrementing {product_id}"
                )));
            }
        }

        self.inventory
            .decrement(product_id, i64::from(quantity), idempotency_key)
            .await
            .map_err(|e| match e {
                InventoryError::InsufficientStock { .. } => {
                    GatewayError::InsufficientStock(product_id.clone())
                }
                other => other.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;
    use store::InMemoryInventoryStore;

    fn gateway(stock: u32) -> InProcessProductGateway<InMemoryInventoryStore> {
        let store = InMemoryInventoryStore::with_products([ProductStock::new(
            "p1",
            "Mug",
            Money::from_cents(800),
            stock,
            "seller-1",
        )]);
        InProcessProductGateway::new(InventoryService::new(store))
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_distinguished() {
        let gateway = gateway(1);
        let err = gateway
            .decrement(&ProductId::new("p1"), 2, None, &CallerCredential::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InsufficientStock(_)));
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let gateway = gateway(5);
        gateway.fail_decrement_for("p1").await;

        let err = gateway
            .decrement(&ProductId::new("p1"), 1, None, &CallerCredential::default())
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(gateway.decrement_calls().await, 1);
        assert_eq!(
            gateway.inventory().get_product(&ProductId::new("p1")).await.unwrap().stock,
            5
        );

        gateway.set_unavailable(true).await;
        let err = gateway.get_product(&ProductId::new("p1")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let gateway = gateway(5);
        let err = gateway
            .get_product(&ProductId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }
}
