pub mod carts;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use serde::Serialize;

/// `{"message": ...}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
