//! Payment-intent creation against the external provider.
//!
//! Only intent creation lives here; confirmation happens client-side with the
//! returned client secret.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("request to payment provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment provider rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<PaymentIntent, PaymentError>;
}

/// Converts a decimal price into minor currency units (cents).
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

#[derive(Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Form fields of a card payment-intent request.
fn intent_form(amount_minor: i64, currency: &str) -> Vec<(&'static str, String)> {
    vec![
        ("amount", amount_minor.to_string()),
        ("currency", currency.to_string()),
        ("payment_method_types[]", "card".to_string()),
    ]
}

/// Human-readable reason from a failed provider response: the error message,
/// else the error code, else the status line.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ProviderError>(body)
        .ok()
        .and_then(|ProviderError { error }| error.message.or(error.code))
        .unwrap_or_else(|| status.to_string())
}

pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: SecretString,
}

impl StripeGateway {
    pub fn new(api_base: impl Into<String>, secret_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            secret_key,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.api_base.trim_end_matches('/'));
        debug!("Creating payment intent for {amount_minor} {currency}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.secret_key.expose_secret())
            .form(&intent_form(amount_minor, currency))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = rejection_message(status, &response.bytes().await?);
            warn!("Payment provider returned {status}: {message}");
            return Err(PaymentError::Rejected(message));
        }

        Ok(response.json::<PaymentIntent>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_prices_to_cents() {
        assert_eq!(to_minor_units(10.0), 1000);
        assert_eq!(to_minor_units(10.99), 1099);
        assert_eq!(to_minor_units(0.1 + 0.2), 30);
        assert_eq!(to_minor_units(0.0), 0);
    }

    #[test]
    fn intent_form_requests_card_payments() {
        let form = intent_form(1099, "usd");
        assert_eq!(
            form,
            [
                ("amount", "1099".to_string()),
                ("currency", "usd".to_string()),
                ("payment_method_types[]", "card".to_string()),
            ]
        );
    }

    #[test]
    fn rejection_prefers_message_then_code_then_status() {
        let status = StatusCode::PAYMENT_REQUIRED;

        let body = br#"{"error":{"message":"Your card was declined.","code":"card_declined"}}"#;
        assert_eq!(rejection_message(status, body), "Your card was declined.");

        let body = br#"{"error":{"code":"amount_too_small"}}"#;
        assert_eq!(rejection_message(status, body), "amount_too_small");

        assert_eq!(rejection_message(status, br#"{"error":{}}"#), "402 Payment Required");
        assert_eq!(rejection_message(StatusCode::BAD_GATEWAY, b"<html>upstream down</html>"), "502 Bad Gateway");
    }
}
