//! Payment processor client.

use std::time::Duration;

use axum::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ApiErrorResponse, BankAccount, Charge, Customer};
use crate::config::{PaymentConfig, PaymentEnvironment};

/// Error type for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// HTTP request failed or the body could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor answered with an error body.
    #[error("payment API error: {error_type} - {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
        code: Option<String>,
    },
}

/// One remote round trip per call; nothing is cached or retried.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, PaymentError>;

    /// Confirms the two micro-deposit amounts (in cents) sent to the account.
    async fn verify_source(
        &self,
        customer_id: &str,
        source_id: &str,
        amounts: [u32; 2],
    ) -> Result<BankAccount, PaymentError>;

    async fn attach_source(
        &self,
        customer_id: &str,
        source_token: &str,
    ) -> Result<BankAccount, PaymentError>;

    async fn create_charge(
        &self,
        customer_id: &str,
        amount: i64,
        currency: &str,
    ) -> Result<Charge, PaymentError>;
}

/// Form-encoded REST client authenticated with the secret key.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    api_key: String,
    base_url: String,
    environment: PaymentEnvironment,
}

impl StripeGateway {
    pub fn new(cfg: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_key: cfg.secret_key.clone(),
            base_url: cfg.api_base.trim_end_matches('/').to_string(),
            environment: cfg.environment,
        })
    }

    pub fn environment(&self) -> PaymentEnvironment {
        self.environment
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, PaymentError> {
        debug!(path, environment = %self.environment, "payment api request");
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(params)
            .send()
            .await?;

        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PaymentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    match response.json::<ApiErrorResponse>().await {
        Ok(body) => Err(PaymentError::Api {
            status: status.as_u16(),
            error_type: body.error.error_type,
            message: body.error.message,
            code: body.error.code,
        }),
        Err(_) => Err(PaymentError::Api {
            status: status.as_u16(),
            error_type: "unknown".to_string(),
            message: format!("HTTP {status}"),
            code: None,
        }),
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, PaymentError> {
        self.post_form(
            "/customers",
            &[("email", email.to_string()), ("name", name.to_string())],
        )
        .await
    }

    async fn verify_source(
        &self,
        customer_id: &str,
        source_id: &str,
        amounts: [u32; 2],
    ) -> Result<BankAccount, PaymentError> {
        self.post_form(
            &format!("/customers/{customer_id}/sources/{source_id}/verify"),
            &[
                ("amounts[0]", amounts[0].to_string()),
                ("amounts[1]", amounts[1].to_string()),
            ],
        )
        .await
    }

    async fn attach_source(
        &self,
        customer_id: &str,
        source_token: &str,
    ) -> Result<BankAccount, PaymentError> {
        self.post_form(
            &format!("/customers/{customer_id}/sources"),
            &[("source", source_token.to_string())],
        )
        .await
    }

    async fn create_charge(
        &self,
        customer_id: &str,
        amount: i64,
        currency: &str,
    ) -> Result<Charge, PaymentError> {
        self.post_form(
            "/charges",
            &[
                ("amount", amount.to_string()),
                ("currency", currency.to_string()),
                ("customer", customer_id.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn gateway(server: &MockServer) -> StripeGateway {
        StripeGateway::new(&PaymentConfig {
            secret_key: "sk_test_123".into(),
            environment: PaymentEnvironment::Sandbox,
            api_base: format!("{}/", server.uri()),
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn create_customer_posts_form_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .and(header("authorization", "Basic c2tfdGVzdF8xMjM6"))
            .and(body_string_contains("email=a%40b.com"))
            .and(body_string_contains("name=A+B"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cus_123",
                "object": "customer",
                "email": "a@b.com",
                "name": "A B",
                "created": 1700000000,
                "livemode": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let customer = gateway(&server).create_customer("a@b.com", "A B").await.unwrap();
        assert_eq!(customer.id, "cus_123");
        assert_eq!(customer.email.as_deref(), Some("a@b.com"));
        assert_eq!(customer.name.as_deref(), Some("A B"));
    }

    #[tokio::test]
    async fn verify_source_sends_both_amounts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers/cus_1/sources/ba_1/verify"))
            .and(body_string_contains("amounts%5B0%5D=32"))
            .and(body_string_contains("amounts%5B1%5D=45"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ba_1",
                "object": "bank_account",
                "customer": "cus_1",
                "status": "verified"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let account = gateway(&server)
            .verify_source("cus_1", "ba_1", [32, 45])
            .await
            .unwrap();
        assert_eq!(account.status.as_deref(), Some("verified"));
    }

    #[tokio::test]
    async fn attach_source_posts_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers/cus_1/sources"))
            .and(body_string_contains("source=btok_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ba_9",
                "customer": "cus_1",
                "status": "new",
                "bank_name": "STRIPE TEST BANK",
                "last4": "6789"
            })))
            .mount(&server)
            .await;

        let account = gateway(&server).attach_source("cus_1", "btok_1").await.unwrap();
        assert_eq!(account.id, "ba_9");
        assert_eq!(account.last4.as_deref(), Some("6789"));
    }

    #[tokio::test]
    async fn create_charge_echoes_amount_and_currency() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/charges"))
            .and(body_string_contains("amount=1000"))
            .and(body_string_contains("currency=usd"))
            .and(body_string_contains("customer=cus_x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch_1",
                "amount": 1000,
                "currency": "usd",
                "customer": "cus_x",
                "status": "pending",
                "paid": false,
                "source": {"id": "ba_9", "object": "bank_account"},
                "metadata": {}
            })))
            .mount(&server)
            .await;

        let charge = gateway(&server).create_charge("cus_x", 1000, "usd").await.unwrap();
        assert_eq!(charge.amount, 1000);
        assert_eq!(charge.currency, "usd");
        assert_eq!(charge.customer.as_deref(), Some("cus_x"));

        let echoed = serde_json::to_value(&charge).unwrap();
        assert_eq!(echoed["source"]["id"], "ba_9");
        assert_eq!(echoed["metadata"], json!({}));
        assert!(!charge.extra.contains_key("amount"));
    }

    #[tokio::test]
    async fn api_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/charges"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": {
                    "type": "card_error",
                    "message": "Your account has insufficient funds.",
                    "code": "insufficient_funds"
                }
            })))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .create_charge("cus_x", 1000, "usd")
            .await
            .unwrap_err();
        match &err {
            PaymentError::Api { status, code, .. } => {
                assert_eq!(*status, 402);
                assert_eq!(code.as_deref(), Some("insufficient_funds"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[tokio::test]
    async fn non_json_error_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = gateway(&server).create_customer("a@b.com", "A B").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
    }
}
