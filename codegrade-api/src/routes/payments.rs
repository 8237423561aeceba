/// Payment endpoints
///
/// # Endpoints
///
/// ```text
/// POST /v1/payments/intent     # start buying a full report (authenticated)
/// POST /v1/payments/webhook    # payment provider callback (signed, no JWT)
/// GET  /v1/payments            # caller's payment history (authenticated)
/// ```
///
/// # Unlock Flow
///
/// ```text
/// client ── POST /intent ──> API ── create payment intent ──> provider
/// client <── client_secret ──┘
/// client ── confirms card ──────────────────────────────────> provider
/// provider ── payment_intent.succeeded (Stripe-Signature) ──> /webhook
///     tx: evaluation.is_paid = true, payment recorded, plan raised to Premium
/// ```
///
/// The report is only unlocked by a webhook whose signature verifies.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Extension, Json,
};
use codegrade_shared::auth::middleware::AuthContext;
use codegrade_shared::billing::events::{EventKind, PaymentIntent, WebhookEvent};
use codegrade_shared::billing::signature::{verify_signature, SIGNATURE_HEADER};
use codegrade_shared::billing::CreatePaymentIntent;
use codegrade_shared::models::evaluation::Evaluation;
use codegrade_shared::models::payment::{Payment, PaymentStatus, RecordPayment};
use codegrade_shared::models::profile::{Profile, SubscriptionPlan};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment intent request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequest {
    /// Evaluation whose full report is being bought
    pub evaluation_id: Uuid,
}

/// Payment intent response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentResponse {
    /// Secret the browser uses to confirm the payment
    pub client_secret: String,

    /// Amount in cents
    pub amount: i64,

    /// Currency code
    pub currency: String,
}

/// Webhook acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    /// Always true once the event was verified
    pub received: bool,
}

/// Creates a payment intent for one evaluation's full report
///
/// # Errors
///
/// - 400 Bad Request: report already unlocked
/// - 403 Forbidden: evaluation belongs to another user
/// - 404 Not Found: no such evaluation
/// - 503 Service Unavailable: payment provider unreachable
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateIntentRequest>,
) -> ApiResult<Json<CreateIntentResponse>> {
    let evaluation = Evaluation::find_by_id(&state.db, request.evaluation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evaluation not found".to_string()))?;

    let owner = Evaluation::owner_id(&state.db, evaluation.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evaluation not found".to_string()))?;

    if owner != auth.user_id {
        tracing::warn!(
            evaluation_id = %evaluation.id,
            user_id = %auth.user_id,
            "Rejected payment for another user's evaluation"
        );
        return Err(ApiError::Forbidden("Not your evaluation".to_string()));
    }

    if evaluation.is_paid {
        return Err(ApiError::BadRequest("Report already unlocked".to_string()));
    }

    let billing = &state.config.billing;
    let intent = state
        .billing
        .create_payment_intent(&CreatePaymentIntent {
            amount: billing.report_price_cents,
            currency: billing.report_currency.clone(),
            evaluation_id: evaluation.id,
            user_id: auth.user_id,
        })
        .await?;

    let client_secret = intent.client_secret.clone().ok_or_else(|| {
        ApiError::InternalError(format!("Payment intent {} has no client secret", intent.id))
    })?;

    tracing::info!(
        evaluation_id = %evaluation.id,
        user_id = %auth.user_id,
        payment_intent = %intent.id,
        "Payment intent created"
    );

    Ok(Json(CreateIntentResponse {
        client_secret,
        amount: intent.amount,
        currency: intent.currency,
    }))
}

/// Lists the caller's payments, newest first
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(Payment::list_by_user(&state.db, auth.user_id).await?))
}

/// Payment provider webhook
///
/// The raw body is verified against the `Stripe-Signature` header before
/// anything is parsed.
///
/// # Errors
///
/// - 400 Bad Request: missing or invalid signature, stale timestamp,
///   unparseable event
/// - 500 Internal Server Error: storage failure (the provider retries)
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let billing = &state.config.billing;
    verify_signature(
        &body,
        signature,
        &billing.webhook_secret,
        billing.webhook_tolerance_secs,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook with invalid signature");
        ApiError::from(e)
    })?;

    let event = WebhookEvent::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Webhook received");

    match event.kind() {
        EventKind::PaymentSucceeded => {
            let intent = event
                .payment_intent()
                .map_err(|e| ApiError::BadRequest(format!("Invalid payment intent: {}", e)))?;
            handle_payment_succeeded(&state, &intent).await?;
        }
        EventKind::PaymentFailed => {
            let intent = event
                .payment_intent()
                .map_err(|e| ApiError::BadRequest(format!("Invalid payment intent: {}", e)))?;
            handle_payment_failed(&state, &intent).await?;
        }
        EventKind::Other(kind) => {
            tracing::debug!(event_type = %kind, "Ignoring webhook event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Evaluation and owner a payment intent refers to
///
/// `None` when the metadata is missing or the evaluation no longer exists;
/// such events are acknowledged and dropped since retrying cannot help.
async fn resolve_purchase(
    state: &AppState,
    intent: &PaymentIntent,
) -> ApiResult<Option<(Uuid, Uuid)>> {
    let Some(evaluation_id) = intent.evaluation_id() else {
        tracing::error!(payment_intent = %intent.id, "Payment intent has no evaluation_id metadata");
        return Ok(None);
    };

    let Some(owner) = Evaluation::owner_id(&state.db, evaluation_id).await? else {
        tracing::warn!(
            payment_intent = %intent.id,
            evaluation_id = %evaluation_id,
            "Payment intent refers to a missing evaluation"
        );
        return Ok(None);
    };

    if let Some(user_id) = intent.user_id() {
        if user_id != owner {
            tracing::warn!(
                payment_intent = %intent.id,
                evaluation_id = %evaluation_id,
                metadata_user_id = %user_id,
                owner_id = %owner,
                "Payment metadata user differs from evaluation owner"
            );
        }
    }

    Ok(Some((evaluation_id, owner)))
}

async fn handle_payment_succeeded(state: &AppState, intent: &PaymentIntent) -> ApiResult<()> {
    let Some((evaluation_id, user_id)) = resolve_purchase(state, intent).await? else {
        return Ok(());
    };

    let mut tx = state.db.begin().await?;

    let payment = Payment::record(
        &mut tx,
        RecordPayment {
            user_id,
            evaluation_id,
            stripe_payment_id: intent.id.clone(),
            amount: intent.amount,
            status: PaymentStatus::Completed,
        },
    )
    .await?;

    if payment.is_none() {
        tracing::info!(payment_intent = %intent.id, "Payment already processed");
        return Ok(());
    }

    if Evaluation::mark_paid(&mut tx, evaluation_id).await?.is_none() {
        // Deleted between lookup and transaction; roll back
        tracing::warn!(evaluation_id = %evaluation_id, "Evaluation vanished before unlock");
        return Ok(());
    }

    let upgraded = Profile::raise_plan(&mut tx, user_id, SubscriptionPlan::Premium).await?;

    tx.commit().await?;

    tracing::info!(
        payment_intent = %intent.id,
        evaluation_id = %evaluation_id,
        user_id = %user_id,
        amount = intent.amount,
        upgraded,
        "Report unlocked"
    );

    Ok(())
}

async fn handle_payment_failed(state: &AppState, intent: &PaymentIntent) -> ApiResult<()> {
    let Some((evaluation_id, user_id)) = resolve_purchase(state, intent).await? else {
        return Ok(());
    };

    let mut tx = state.db.begin().await?;
    let payment = Payment::record(
        &mut tx,
        RecordPayment {
            user_id,
            evaluation_id,
            stripe_payment_id: intent.id.clone(),
            amount: intent.amount,
            status: PaymentStatus::Failed,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::warn!(
        payment_intent = %intent.id,
        evaluation_id = %evaluation_id,
        user_id = %user_id,
        recorded = payment.is_some(),
        "Payment failed"
    );

    Ok(())
}
