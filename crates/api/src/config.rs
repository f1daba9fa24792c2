//! Service configuration loaded from environment variables.

use std::time::Duration;

use checkout::RetryPolicy;

/// Default listen port of the order service.
pub const ORDER_SERVICE_PORT: u16 = 3005;

/// Default listen port of the product service.
pub const PRODUCT_SERVICE_PORT: u16 = 3000;

const DEFAULT_JWT_SECRET: &str = "insecure-development-secret";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: 3005 for orders, 3000 for products)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; in-memory stores when unset
/// - `JWT_SECRET`: HS256 secret shared with the user service
/// - `PRODUCT_SERVICE_URL`, `GATEWAY_TIMEOUT_MS`, `GATEWAY_MAX_ATTEMPTS`,
///   `GATEWAY_BACKOFF_MS`: see [`GatewayConfig`]
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub gateway: GatewayConfig,
}

/// How the order service reaches the product service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the product service (default: `http://localhost:3000`).
    pub product_service_url: String,
    /// Per-request timeout (default: 5000 ms).
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            product_service_url: format!("http://localhost:{PRODUCT_SERVICE_PORT}"),
            timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env(default_port: u16) -> Self {
        Self::from_lookup(default_port, |key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    pub fn from_lookup(default_port: u16, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::with_port(default_port);
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let mut retry = defaults.gateway.retry;
        if let Some(attempts) = number("GATEWAY_MAX_ATTEMPTS") {
            retry.max_attempts = u32::try_from(attempts).unwrap_or(u32::MAX).max(1);
        }
        if let Some(ms) = number("GATEWAY_BACKOFF_MS") {
            retry.initial_backoff = Duration::from_millis(ms);
        }

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            gateway: GatewayConfig {
                product_service_url: lookup("PRODUCT_SERVICE_URL")
                    .unwrap_or(defaults.gateway.product_service_url),
                timeout: number("GATEWAY_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.gateway.timeout),
                retry,
            },
        }
    }

    fn with_port(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
            log_level: "info".to_string(),
            database_url: None,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            gateway: GatewayConfig::default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if no `JWT_SECRET` was configured.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_port(ORDER_SERVICE_PORT)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3005);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert!(config.uses_default_secret());
        assert_eq!(config.gateway.product_service_url, "http://localhost:3000");
        assert_eq!(config.gateway.timeout, Duration::from_millis(5000));
        assert_eq!(config.gateway.retry.max_attempts, 3);
    }

    #[test]
    fn test_product_service_default_port() {
        let config = Config::from_lookup(PRODUCT_SERVICE_PORT, lookup(&[]));
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(
            ORDER_SERVICE_PORT,
            lookup(&[
                ("HOST", "127.0.0.1"),
                ("PORT", "8080"),
                ("DATABASE_URL", "postgres://localhost/market"),
                ("JWT_SECRET", "s3cret"),
                ("PRODUCT_SERVICE_URL", "http://products:3000"),
                ("GATEWAY_TIMEOUT_MS", "250"),
                ("GATEWAY_MAX_ATTEMPTS", "5"),
                ("GATEWAY_BACKOFF_MS", "20"),
            ]),
        );

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/market")
        );
        assert!(!config.uses_default_secret());
        assert_eq!(config.gateway.product_service_url, "http://products:3000");
        assert_eq!(config.gateway.timeout, Duration::from_millis(250));
        assert_eq!(config.gateway.retry.max_attempts, 5);
        assert_eq!(config.gateway.retry.initial_backoff, Duration::from_millis(20));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(
            ORDER_SERVICE_PORT,
            lookup(&[
                ("PORT", "not-a-port"),
                ("GATEWAY_TIMEOUT_MS", "soon"),
                ("GATEWAY_MAX_ATTEMPTS", "0"),
                ("DATABASE_URL", "  "),
            ]),
        );
        assert_eq!(config.port, 3005);
        assert_eq!(config.gateway.timeout, Duration::from_millis(5000));
        assert_eq!(config.gateway.retry.max_attempts, 1);
        assert!(config.database_url.is_none());
    }
}
