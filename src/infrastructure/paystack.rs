use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::errors::DomainError;
use crate::domain::order::{PaymentRequest, PaymentSession, TransactionStatus};
use crate::domain::ports::PaymentGateway;

/// No automatic retry: a slow or flaky gateway surfaces as an error and the
/// order stays recoverable in `pending`.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin adapter over the Paystack REST API. Holds its own `reqwest::Client`
/// carrying the bearer secret on every call.
pub struct PaystackClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .expect("Failed to build the gateway HTTP client");
        Self {
            http,
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }
}

// Paystack envelopes every response as {status, message, data}; only the
// fields we act on are modeled.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
}

fn initialize_body(request: &PaymentRequest) -> Value {
    json!({
        "email": request.email,
        "amount": request.amount_minor,
        "callback_url": request.callback_url,
        "cancel_url": request.cancel_url,
        "metadata": {
            "orderId": request.order_id,
            "userId": request.user_id,
            "custom_fields": [
                {
                    "display_name": "Order ID",
                    "variable_name": "order_id",
                    "value": request.order_id,
                }
            ],
        },
    })
}

#[async_trait::async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: &PaymentRequest) -> Result<PaymentSession, DomainError> {
        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&initialize_body(request))
            .send()
            .await
            .map_err(|e| DomainError::PaymentInit(e.to_string()))?;

        let http_status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::PaymentInit(e.to_string()))?;
        if !http_status.is_success() {
            return Err(DomainError::PaymentInit(body));
        }

        let envelope: Envelope<InitializeData> = serde_json::from_str(&body)
            .map_err(|e| DomainError::PaymentInit(format!("unparseable gateway response: {e}")))?;
        if !envelope.status {
            return Err(DomainError::PaymentInit(body));
        }
        let data = envelope
            .data
            .ok_or_else(|| DomainError::PaymentInit("gateway response missing data".to_string()))?;

        Ok(PaymentSession {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<TransactionStatus, DomainError> {
        let response = self
            .http
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| DomainError::Verification(e.to_string()))?;

        let http_status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Verification(e.to_string()))?;
        if !http_status.is_success() {
            return Err(DomainError::Verification(body));
        }

        let envelope: Envelope<VerifyData> = serde_json::from_str(&body)
            .map_err(|e| DomainError::Verification(format!("unparseable gateway response: {e}")))?;
        let data = envelope.data.ok_or_else(|| {
            DomainError::Verification("gateway response missing data".to_string())
        })?;

        Ok(TransactionStatus::from_wire(&data.status))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn initialize_body_carries_minor_units_and_reconciliation_metadata() {
        let order_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let request = PaymentRequest {
            email: "test@example.com".to_string(),
            amount_minor: 4097,
            callback_url: format!("http://localhost:5173/verify?success=true&orderId={order_id}"),
            cancel_url: format!("http://localhost:5173/verify?success=false&orderId={order_id}"),
            order_id,
            user_id,
        };

        let body = initialize_body(&request);

        assert_eq!(body["email"], "test@example.com");
        assert_eq!(body["amount"], 4097);
        assert_eq!(body["metadata"]["orderId"], json!(order_id));
        assert_eq!(body["metadata"]["userId"], json!(user_id));
        assert_eq!(
            body["metadata"]["custom_fields"][0]["variable_name"],
            "order_id"
        );
        assert!(body["callback_url"]
            .as_str()
            .unwrap()
            .contains("/verify?success=true&orderId="));
        assert!(body["cancel_url"]
            .as_str()
            .unwrap()
            .contains("/verify?success=false&orderId="));
    }

    #[test]
    fn initialize_response_envelope_parses() {
        let body = r#"{
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": "https://checkout.paystack.com/mock-url",
                "access_code": "mock_access_code",
                "reference": "mock_reference"
            }
        }"#;

        let envelope: Envelope<InitializeData> = serde_json::from_str(body).expect("parse failed");
        assert!(envelope.status);
        let data = envelope.data.unwrap();
        assert_eq!(
            data.authorization_url,
            "https://checkout.paystack.com/mock-url"
        );
        assert_eq!(data.access_code, "mock_access_code");
        assert_eq!(data.reference, "mock_reference");
    }

    #[test]
    fn verify_response_envelope_parses_extra_fields() {
        // Paystack returns far more than the status; everything else is ignored.
        let body = r#"{
            "status": true,
            "message": "Verification successful",
            "data": {
                "status": "success",
                "reference": "mock_reference",
                "amount": 4097,
                "currency": "NGN"
            }
        }"#;

        let envelope: Envelope<VerifyData> = serde_json::from_str(body).expect("parse failed");
        assert_eq!(
            TransactionStatus::from_wire(&envelope.data.unwrap().status),
            TransactionStatus::Success
        );
    }

    #[test]
    fn declined_envelope_is_not_success() {
        let body = r#"{"status": true, "data": {"status": "abandoned"}}"#;
        let envelope: Envelope<VerifyData> = serde_json::from_str(body).expect("parse failed");
        assert_ne!(
            TransactionStatus::from_wire(&envelope.data.unwrap().status),
            TransactionStatus::Success
        );
    }
}
