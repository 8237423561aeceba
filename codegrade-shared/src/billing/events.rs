/// Webhook event payloads
///
/// Only the fields the application reads are modelled; everything else in
/// the provider's event body is ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::BillingError;

/// Event type for a confirmed charge
pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Event type for a declined or failed charge
pub const PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Event types the webhook acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `payment_intent.succeeded`
    PaymentSucceeded,

    /// `payment_intent.payment_failed`
    PaymentFailed,

    /// Anything else; acknowledged and ignored
    Other(String),
}

/// Webhook event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID
    pub id: String,

    /// Event type, e.g. `payment_intent.succeeded`
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event data
    pub data: EventData,
}

/// `data` member of an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    /// The object the event is about
    pub object: serde_json::Value,
}

/// Payment intent, as returned by the API and embedded in events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Payment intent ID (`pi_...`)
    pub id: String,

    /// Amount in the smallest currency unit
    pub amount: i64,

    /// Three-letter currency code
    pub currency: String,

    /// Provider status
    #[serde(default)]
    pub status: Option<String>,

    /// Secret the browser uses to confirm the payment
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Metadata attached at creation
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl WebhookEvent {
    /// Parses a raw (already verified) webhook body
    pub fn from_slice(body: &[u8]) -> Result<Self, BillingError> {
        serde_json::from_slice(body).map_err(|e| BillingError::Decode(e.to_string()))
    }

    /// Classifies the event type
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            PAYMENT_SUCCEEDED => EventKind::PaymentSucceeded,
            PAYMENT_FAILED => EventKind::PaymentFailed,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// Decodes `data.object` as a payment intent
    pub fn payment_intent(&self) -> Result<PaymentIntent, BillingError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| BillingError::Decode(format!("payment intent: {}", e)))
    }
}

impl PaymentIntent {
    fn metadata_uuid(&self, snake: &str, camel: &str) -> Option<Uuid> {
        self.metadata
            .get(snake)
            .or_else(|| self.metadata.get(camel))
            .and_then(|v| Uuid::parse_str(v).ok())
    }

    /// Evaluation this payment unlocks
    ///
    /// Accepts `evaluation_id` and the older `evaluationId` key.
    pub fn evaluation_id(&self) -> Option<Uuid> {
        self.metadata_uuid("evaluation_id", "evaluationId")
    }

    /// Paying user
    ///
    /// Accepts `user_id` and the older `userId` key.
    pub fn user_id(&self) -> Option<Uuid> {
        self.metadata_uuid("user_id", "userId")
    }
}
