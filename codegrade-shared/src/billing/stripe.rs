/// Payment intent client
///
/// Talks to the provider's REST API directly: form-encoded requests
/// authenticated with the secret key as a bearer token.
///
/// # Example
///
/// ```no_run
/// use codegrade_shared::billing::stripe::{CreatePaymentIntent, StripeClient};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StripeClient::new("sk_test_...", "https://api.stripe.com");
///
/// let intent = client.create_payment_intent(&CreatePaymentIntent {
///     amount: 499,
///     currency: "usd".to_string(),
///     evaluation_id: Uuid::new_v4(),
///     user_id: Uuid::new_v4(),
/// }).await?;
///
/// println!("client secret: {:?}", intent.client_secret);
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{events::PaymentIntent, BillingError};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Parameters for a report purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePaymentIntent {
    /// Amount in the smallest currency unit
    pub amount: i64,

    /// Three-letter currency code
    pub currency: String,

    /// Evaluation being purchased (stored in metadata)
    pub evaluation_id: Uuid,

    /// Buyer (stored in metadata)
    pub user_id: Uuid,
}

impl CreatePaymentIntent {
    fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("amount", self.amount.to_string()),
            ("currency", self.currency.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[evaluation_id]", self.evaluation_id.to_string()),
            ("metadata[user_id]", self.user_id.to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Payment provider API client
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    /// Creates a client for `api_base` (without trailing `/v1`)
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a payment intent
    ///
    /// # Errors
    ///
    /// - `BillingError::Http` if the provider is unreachable
    /// - `BillingError::Provider` for a non-2xx response
    /// - `BillingError::Decode` if the response is not a payment intent
    pub async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, BillingError> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        debug!(evaluation_id = %params.evaluation_id, amount = params.amount, "Creating payment intent");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params.form())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);

            warn!(status = status.as_u16(), %message, "Payment intent creation rejected");
            return Err(BillingError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let intent = response.json::<PaymentIntent>().await?;
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and hands back the raw request
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .filter_map(|l| l.split_once(':'))
                        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();

            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn params() -> CreatePaymentIntent {
        CreatePaymentIntent {
            amount: 499,
            currency: "usd".to_string(),
            evaluation_id: Uuid::nil(),
            user_id: Uuid::nil(),
        }
    }

    #[tokio::test]
    async fn test_create_payment_intent_success() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"id":"pi_1","object":"payment_intent","amount":499,"currency":"usd","status":"requires_payment_method","client_secret":"pi_1_secret_abc","metadata":{}}"#,
        )
        .await;

        let client = StripeClient::new("sk_test_123", base);
        let intent = client.create_payment_intent(&params()).await.unwrap();

        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.client_secret.as_deref(), Some("pi_1_secret_abc"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/payment_intents"));
        assert!(request.contains("Bearer sk_test_123") || request.contains("bearer sk_test_123"));
        assert!(request.contains("amount=499"));
        assert!(request.contains("currency=usd"));
        assert!(request.contains("metadata%5Bevaluation_id%5D="));
    }

    #[tokio::test]
    async fn test_create_payment_intent_provider_error() {
        let (base, _server) = serve_once(
            "HTTP/1.1 402 Payment Required",
            r#"{"error":{"type":"card_error","message":"Your card was declined."}}"#,
        )
        .await;

        let client = StripeClient::new("sk_test_123", base);
        match client.create_payment_intent(&params()).await {
            Err(BillingError::Provider { status, message }) => {
                assert_eq!(status, 402);
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_payment_intent_unreachable() {
        let client = StripeClient::new("sk_test_123", "http://127.0.0.1:1");
        assert!(matches!(
            client.create_payment_intent(&params()).await,
            Err(BillingError::Http(_))
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = StripeClient::new("sk", "https://api.example.com/");
        assert_eq!(client.api_base, "https://api.example.com");
    }
}
