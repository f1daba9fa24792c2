//! Product Availability Gateway: the order service's view of product stock.

mod http;
mod in_process;
mod retry;

pub use http::HttpProductGateway;
pub use in_process::InProcessProductGateway;
pub use retry::RetryPolicy;

use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use domain::ProductStock;

use crate::error::GatewayError;
use crate::services::DecrementAck;

/// Name of the cookie carrying the caller's token.
pub const AUTH_COOKIE: &str = "authToken";

/// Header carrying the decrement idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// The caller's credential, forwarded unchanged to the product service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerCredential {
    /// Full `Authorization` header value, e.g. `Bearer <jwt>`.
    pub authorization: Option<String>,
    /// Value of the `authToken` cookie.
    pub auth_token_cookie: Option<String>,
}

impl CallerCredential {
    /// A credential presented as a bearer token.
    pub fn bearer(token: impl AsRef<str>) -> Self {
        Self {
            authorization: Some(format!("Bearer {}", token.as_ref())),
            auth_token_cookie: None,
        }
    }

    /// A credential presented as the `authToken` cookie.
    pub fn cookie(token: impl Into<String>) -> Self {
        Self {
            authorization: None,
            auth_token_cookie: Some(token.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.authorization.is_none() && self.auth_token_cookie.is_none()
    }
}

/// Stock reads and decrements against the product service.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    /// Reads a product. The result is advisory; it may be stale by the time
    /// a decrement is issued.
    async fn get_product(&self, product_id: &ProductId) -> Result<ProductStock, GatewayError>;

    /// Asks the product service to remove `quantity` units.
    ///
    /// Returns [`GatewayError::InsufficientStock`] when the product service
    /// refused the decrement for lack of stock.
    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
        credential: &CallerCredential,
    ) -> Result<DecrementAck, GatewayError>;
}

#[async_trait]
impl<T: ProductGateway + ?Sized> ProductGateway for Arc<T> {
    async fn get_product(&self, product_id: &ProductId) -> Result<ProductStock, GatewayError> {
        (**self).get_product(product_id).await
    }

    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
        credential: &CallerCredential,
    ) -> Result<DecrementAck, GatewayError> {
        (**self)
            .decrement(product_id, quantity, idempotency_key, credential)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_constructors() {
        let bearer = CallerCredential::bearer("abc");
        assert_eq!(bearer.authorization.as_deref(), Some("Bearer abc"));
        assert!(bearer.auth_token_cookie.is_none());

        let cookie = CallerCredential::cookie("abc");
        assert_eq!(cookie.auth_token_cookie.as_deref(), Some("abc"));
        assert!(!cookie.is_empty());
        assert!(CallerCredential::default().is_empty());
    }
}
