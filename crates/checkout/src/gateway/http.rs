use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use domain::ProductStock;
use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};

use super::{AUTH_COOKIE, CallerCredential, IDEMPOTENCY_KEY_HEADER, ProductGateway, RetryPolicy};
use crate::error::{GatewayError, INSUFFICIENT_STOCK_MESSAGE};
use crate::services::DecrementAck;

/// Gateway calling the product service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProductGateway {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecrementBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpProductGateway {
    /// Creates a gateway for the product service at `base_url`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<ProductStock, GatewayError> {
        let url = format!("{}/api/products/{}", self.base_url, product_id);
        let response = self.http.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(product_id.clone())),
            _ => Err(unexpected(response).await),
        }
    }

    async fn send_decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
        credential: &CallerCredential,
    ) -> Result<DecrementAck, GatewayError> {
        let url = format!("{}/api/products/decrement", self.base_url);
        let mut request = self.http.post(&url).json(&DecrementBody {
            product_id,
            quantity,
        });
        if let Some(authorization) = &credential.authorization {
            request = request.header(header::AUTHORIZATION, authorization);
        }
        if let Some(token) = &credential.auth_token_cookie {
            request = request.header(header::COOKIE, format!("{AUTH_COOKIE}={token}"));
        }
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(product_id.clone())),
            StatusCode::BAD_REQUEST => {
                let message = error_message(response).await;
                if message == INSUFFICIENT_STOCK_MESSAGE {
                    Err(GatewayError::InsufficientStock(product_id.clone()))
                } else {
                    Err(GatewayError::Rejected(message))
                }
            }
            _ => Err(unexpected(response).await),
        }
    }
}

async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text)
}

async fn unexpected(response: Response) -> GatewayError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return GatewayError::Unauthorized;
    }
    let message = error_message(response).await;
    if status.is_server_error() {
        GatewayError::Upstream {
            status: status.as_u16(),
            message,
        }
    } else {
        GatewayError::Rejected(format!("status {status}: {message}"))
    }
}

#[async_trait]
impl ProductGateway for HttpProductGateway {
    #[tracing::instrument(skip(self))]
    async fn get_product(&self, product_id: &ProductId) -> Result<ProductStock, GatewayError> {
        self.retry
            .run("get_product", || self.fetch_product(product_id))
            .await
    }

    #[tracing::instrument(skip(self, credential))]
    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
        credential: &CallerCredential,
    ) -> Result<DecrementAck, GatewayError> {
        // Without a key a retried decrement could be applied twice.
        let policy = match idempotency_key {
            Some(_) => self.retry,
            None => RetryPolicy::none(),
        };
        policy
            .run("decrement", || {
                self.send_decrement(product_id, quantity, idempotency_key, credential)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let gateway = HttpProductGateway::new(
            "http://localhost:3000/",
            Duration::from_secs(1),
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let gateway = HttpProductGateway::new(
            "http://127.0.0.1:9",
            Duration::from_millis(500),
            RetryPolicy::none(),
        )
        .unwrap();

        let err = gateway
            .get_product(&ProductId::new("p1"))
            .await
            .unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err:?}");
    }
}
