//! Inventory service backing the product service's decrement endpoint.

use common::ProductId;
use domain::{AvailabilityStatus, ProductStock, StockError};
use serde::{Deserialize, Serialize};
use store::{DecrementOutcome, InventoryStore};

use crate::error::InventoryError;

/// Acknowledgement of an applied (or replayed) decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecrementAck {
    pub product_id: ProductId,
    /// Stock remaining after the decrement.
    pub stock: u32,
    pub availability_status: AvailabilityStatus,
    /// True when the idempotency key had already been applied.
    #[serde(default)]
    pub replayed: bool,
}

impl DecrementAck {
    fn from_product(product: ProductStock, replayed: bool) -> Self {
        Self {
            product_id: product.id,
            stock: product.stock,
            availability_status: product.availability_status,
            replayed,
        }
    }
}

/// Owns the product stock counter.
#[derive(Debug, Clone)]
pub struct InventoryService<S> {
    store: S,
}

impl<S: InventoryStore> InventoryService<S> {
    /// Creates a new inventory service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a product.
    pub async fn get_product(&self, product_id: &ProductId) -> Result<ProductStock, InventoryError> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(product_id.clone()))
    }

    /// Removes `quantity` units of a product if enough remain.
    ///
    /// A repeated `idempotency_key` returns the original acknowledgement
    /// with `replayed` set and does not touch the stock again.
    #[tracing::instrument(skip(self))]
    pub async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: i64,
        idempotency_key: Option<&str>,
    ) -> Result<DecrementAck, InventoryError> {
        if product_id.is_blank() {
            return Err(InventoryError::InvalidRequest);
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(InventoryError::InvalidRequest)?;

        let outcome = self
            .store
            .decrement(product_id, quantity, idempotency_key)
            .await
            .inspect_err(|_| {
                metrics::counter!("inventory_decrements_total", "outcome" => "error").increment(1);
            })?;

        match outcome {
            DecrementOutcome::Applied(product) => {
                metrics::counter!("inventory_decrements_total", "outcome" => "applied")
                    .increment(1);
                tracing::info!(
                    stock = product.stock,
                    status = %product.availability_status,
                    "inventory decremented"
                );
                Ok(DecrementAck::from_product(product, false))
            }
            DecrementOutcome::Replayed(product) => {
                metrics::counter!("inventory_decrements_total", "outcome" => "replayed")
                    .increment(1);
                tracing::info!("duplicate decrement ignored");
                Ok(DecrementAck::from_product(product, true))
            }
            DecrementOutcome::NotFound => {
                metrics::counter!("inventory_decrements_total", "outcome" => "not_found")
                    .increment(1);
                Err(InventoryError::NotFound(product_id.clone()))
            }
            DecrementOutcome::Rejected(StockError::Insufficient {
                requested,
                available,
            }) => {
                metrics::counter!("inventory_decrements_total", "outcome" => "insufficient")
                    .increment(1);
                tracing::info!(requested, available, "decrement rejected");
                Err(InventoryError::InsufficientStock {
                    requested,
                    available,
                })
            }
            DecrementOutcome::Rejected(StockError::InvalidQuantity(_)) => {
                Err(InventoryError::InvalidRequest)
            }
        }
    }
}
