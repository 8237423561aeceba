/// Payment provider integration
///
/// Reports are sold one at a time through the payment provider's
/// payment-intent API. The browser completes the charge with the returned
/// client secret; the provider then calls our webhook, and only a verified
/// webhook unlocks the report.
///
/// # Modules
///
/// - [`stripe`]: REST client creating payment intents
/// - [`signature`]: webhook signature verification (`Stripe-Signature`)
/// - [`events`]: webhook event payloads

pub mod events;
pub mod signature;
pub mod stripe;

pub use events::{EventKind, PaymentIntent, WebhookEvent};
pub use signature::{verify_signature, SignatureError, DEFAULT_TOLERANCE_SECS};
pub use stripe::{CreatePaymentIntent, StripeClient};

/// Error type for payment provider calls
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// Request never got a response
    #[error("Payment provider request failed: {0}")]
    Http(String),

    /// Provider answered with an error status
    #[error("Payment provider returned {status}: {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Provider error message
        message: String,
    },

    /// Response or event body did not have the expected shape
    #[error("Unexpected payment provider payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BillingError::Decode(err.to_string())
        } else {
            BillingError::Http(err.to_string())
        }
    }
}
