//! Checkout request parsing and validation.

use serde::{Deserialize, Serialize};

use super::status::PaymentMethod;
use crate::error::ValidationError;

/// Validated delivery address. Every field is non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Delivery address as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddressInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Body of `POST /checkout` as submitted by the client.
///
/// Every field is optional here so that a missing field surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: Option<String>,
    pub payment_transaction_id: Option<String>,
    pub delivery_address: Option<DeliveryAddressInput>,
    pub phone_number: Option<String>,
}

/// Checkout input after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub payment_method: PaymentMethod,
    pub payment_transaction_id: Option<String>,
    pub delivery_address: DeliveryAddress,
    pub phone_number: String,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl DeliveryAddressInput {
    fn validate(&self) -> Result<DeliveryAddress, ValidationError> {
        match (
            present(&self.street),
            present(&self.city),
            present(&self.postal_code),
            present(&self.country),
        ) {
            (Some(street), Some(city), Some(postal_code), Some(country)) => Ok(DeliveryAddress {
                street,
                city,
                postal_code,
                country,
            }),
            _ => Err(ValidationError::IncompleteAddress),
        }
    }
}

impl CheckoutRequest {
    /// Checks required fields, the payment method and the transaction id rule.
    pub fn validate(&self) -> Result<CheckoutDetails, ValidationError> {
        let (Some(method), Some(address), Some(phone_number)) = (
            present(&self.payment_method),
            self.delivery_address.as_ref(),
            present(&self.phone_number),
        ) else {
            return Err(ValidationError::MissingCheckoutFields);
        };

        let payment_method: PaymentMethod = method
            .parse()
            .map_err(|_| ValidationError::InvalidPaymentMethod(method.clone()))?;
        let delivery_address = address.validate()?;

        let payment_transaction_id = present(&self.payment_transaction_id);
        if payment_method.requires_transaction_id() && payment_transaction_id.is_none() {
            return Err(ValidationError::MissingTransactionId);
        }

        Ok(CheckoutDetails {
            payment_method,
            payment_transaction_id,
            delivery_address,
            phone_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> DeliveryAddressInput {
        DeliveryAddressInput {
            street: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            postal_code: Some("12345".to_string()),
            country: Some("US".to_string()),
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            payment_method: Some("Cash on Delivery".to_string()),
            payment_transaction_id: None,
            delivery_address: Some(address()),
            phone_number: Some("555-0100".to_string()),
        }
    }

    #[test]
    fn test_valid_cash_on_delivery_request() {
        let details = request().validate().unwrap();
        assert_eq!(details.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(details.delivery_address.city, "Springfield");
        assert_eq!(details.phone_number, "555-0100");
    }

    #[test]
    fn test_missing_phone_number() {
        let mut req = request();
        req.phone_number = None;
        assert_eq!(req.validate(), Err(ValidationError::MissingCheckoutFields));

        req.phone_number = Some("   ".to_string());
        assert_eq!(req.validate(), Err(ValidationError::MissingCheckoutFields));
    }

    #[test]
    fn test_missing_address_field() {
        let mut req = request();
        req.delivery_address = Some(DeliveryAddressInput {
            country: None,
            ..address()
        });
        assert_eq!(req.validate(), Err(ValidationError::IncompleteAddress));
    }

    #[test]
    fn test_unknown_payment_method() {
        let mut req = request();
        req.payment_method = Some("Barter".to_string());
        assert_eq!(
            req.validate(),
            Err(ValidationError::InvalidPaymentMethod("Barter".to_string()))
        );
    }

    #[test]
    fn test_card_requires_transaction_id() {
        let mut req = request();
        req.payment_method = Some("Credit Card".to_string());
        assert_eq!(req.validate(), Err(ValidationError::MissingTransactionId));

        req.payment_transaction_id = Some("txn_123".to_string());
        let details = req.validate().unwrap();
        assert_eq!(details.payment_transaction_id.as_deref(), Some("txn_123"));
    }

    #[test]
    fn test_deserializes_camel_case_body() {
        let req: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "paymentMethod": "UPI",
            "paymentTransactionId": "upi-1",
            "deliveryAddress": {
                "street": "1 Main St",
                "city": "Pune",
                "postalCode": "411001",
                "country": "IN"
            },
            "phoneNumber": "98200"
        }))
        .unwrap();
        let details = req.validate().unwrap();
        assert_eq!(details.delivery_address.postal_code, "411001");
        assert_eq!(details.payment_method, PaymentMethod::Upi);
    }
}
