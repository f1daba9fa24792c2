//! Checkout coordinator: turns a user's cart into an order.
//!
//! There is no distributed transaction. The order header is written first,
//! then every cart item is checked, recorded as an order line and decremented
//! at the product service, one item at a time. Nothing is undone on failure;
//! instead the order is marked `Failed` and kept out of the user's history.

use std::time::Instant;

use chrono::Utc;
use common::ProductId;
use domain::{CartItem, CheckoutRequest, CheckoutStatus, Order, OrderLine, UserId};
use serde::Serialize;
use store::{CartStore, OrderStore};

use crate::error::{CheckoutError, GatewayError, Result};
use crate::gateway::{CallerCredential, ProductGateway};

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Why a single cart item could not be turned into a committed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFailure {
    OutOfStock,
    Errored,
}

impl LineFailure {
    fn message(self, product_id: &ProductId) -> String {
        match self {
            Self::OutOfStock => format!("Not enough stock for product {product_id}."),
            Self::Errored => format!("Error processing product {product_id}."),
        }
    }
}

/// Orchestrates checkout across the cart store, the order store and the
/// product gateway.
pub struct CheckoutCoordinator<C, O, G>
where
    C: CartStore,
    O: OrderStore,
    G: ProductGateway,
{
    carts: C,
    orders: O,
    products: G,
}

impl<C, O, G> CheckoutCoordinator<C, O, G>
where
    C: CartStore,
    O: OrderStore,
    G: ProductGateway,
{
    /// Creates a new checkout coordinator.
    pub fn new(carts: C, orders: O, products: G) -> Self {
        Self {
            carts,
            orders,
            products,
        }
    }

    /// Checks out the user's active cart.
    ///
    /// On success every cart item has become an order line, stock has been
    /// decremented for each, the cart is empty and the order is `Confirmed`.
    /// If any item fails, the order is marked `Failed`, the cart is left
    /// as it was, and one message per failed item is returned.
    #[tracing::instrument(skip(self, request, credential))]
    pub async fn checkout(
        &self,
        user_id: &UserId,
        request: &CheckoutRequest,
        credential: &CallerCredential,
    ) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = Instant::now();

        let details = request.validate()?;

        let cart = self
            .carts
            .get_cart(user_id)
            .await?
            .ok_or(CheckoutError::NoCart)?;
        let items = self.carts.list_items(cart.id).await?;
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut order = Order::place(user_id.clone(), details, Utc::now());
        self.orders.create_order(&order).await?;
        tracing::info!(order_id = %order.id, items = items.len(), "order created");

        let mut lines = Vec::with_capacity(items.len());
        let mut failures = Vec::new();
        for item in &items {
            match self.process_line(&order, item, credential).await {
                Ok(line) => lines.push(line),
                Err(failure) => {
                    metrics::counter!("checkout_line_failures_total").increment(1);
                    failures.push(failure.message(&item.product_id));
                }
            }
        }

        if !failures.is_empty() {
            self.record_outcome(&order, CheckoutStatus::Failed).await?;
            metrics::counter!("checkout_failed_total").increment(1);
            metrics::histogram!("checkout_duration_seconds")
                .record(started.elapsed().as_secs_f64());
            tracing::warn!(
                order_id = %order.id,
                failed = failures.len(),
                "checkout failed"
            );
            return Err(CheckoutError::PartialFailure {
                order_id: order.id,
                messages: failures,
            });
        }

        self.carts
            .clear_items(cart.id)
            .await
            .map_err(|e| CheckoutError::Unexpected(format!("failed to clear cart: {e}")))?;
        self.record_outcome(&order, CheckoutStatus::Confirmed)
            .await?;
        order.checkout_status = CheckoutStatus::Confirmed;

        let duration = started.elapsed().as_secs_f64();
        metrics::counter!("checkout_completed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(duration);
        tracing::info!(order_id = %order.id, duration, "checkout completed");

        Ok(CheckoutReceipt { order, lines })
    }

    /// Checks stock, records the order line and decrements stock for one item.
    ///
    /// The line is persisted before the decrement and is not removed if the
    /// decrement then fails.
    #[tracing::instrument(
        skip(self, order, item, credential),
        fields(order_id = %order.id, product_id = %item.product_id, quantity = item.quantity)
    )]
    async fn process_line(
        &self,
        order: &Order,
        item: &CartItem,
        credential: &CallerCredential,
    ) -> std::result::Result<OrderLine, LineFailure> {
        let product = self
            .products
            .get_product(&item.product_id)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "product lookup failed");
                LineFailure::Errored
            })?;

        if product.stock < item.quantity {
            tracing::info!(available = product.stock, "not enough stock");
            return Err(LineFailure::OutOfStock);
        }

        let line = OrderLine::from_cart_item(order.id, item);
        self.orders.create_order_line(&line).await.map_err(|e| {
            tracing::error!(error = %e, "failed to persist order line");
            LineFailure::Errored
        })?;

        let idempotency_key = format!("{}:{}", order.id, item.product_id);
        match self
            .products
            .decrement(
                &item.product_id,
                item.quantity,
                Some(&idempotency_key),
                credential,
            )
            .await
        {
            Ok(ack) => {
                tracing::debug!(remaining = ack.stock, replayed = ack.replayed, "stock decremented");
                Ok(line)
            }
            Err(GatewayError::InsufficientStock(_)) => {
                tracing::info!("decrement refused, stock taken concurrently");
                Err(LineFailure::OutOfStock)
            }
            Err(e) => {
                tracing::warn!(error = %e, "decrement failed");
                Err(LineFailure::Errored)
            }
        }
    }

    async fn record_outcome(&self, order: &Order, status: CheckoutStatus) -> Result<()> {
        self.orders
            .set_checkout_status(order.id, status)
            .await
            .map_err(|e| {
                tracing::error!(order_id = %order.id, %status, error = %e, "failed to record checkout outcome");
                CheckoutError::Unexpected(format!(
                    "order {} processed but not marked {status}: {e}",
                    order.id
                ))
            })
    }
}
