/// Payment model and database operations
///
/// Payments are an audit trail of provider-confirmed checkouts. Rows are
/// only written from verified webhook events, and the provider's payment id
/// is unique so a replayed event records nothing new.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE payments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
///     evaluation_id UUID NOT NULL REFERENCES evaluations(id) ON DELETE CASCADE,
///     stripe_payment_id VARCHAR(255) NOT NULL UNIQUE,
///     amount BIGINT NOT NULL,
///     status VARCHAR(16) NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Checkout started
    Pending,

    /// Provider confirmed the charge
    Completed,

    /// Provider reported a failed charge
    Failed,
}

impl PaymentStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Parses status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Payment record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    /// Unique payment ID
    pub id: Uuid,

    /// Paying user
    pub user_id: Uuid,

    /// Evaluation whose report was purchased
    pub evaluation_id: Uuid,

    /// Payment intent ID at the provider
    pub stripe_payment_id: String,

    /// Amount in the smallest currency unit
    pub amount: i64,

    /// Status (see [`PaymentStatus`])
    pub status: String,

    /// When the payment was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPayment {
    /// Paying user
    pub user_id: Uuid,

    /// Purchased evaluation
    pub evaluation_id: Uuid,

    /// Provider payment intent ID
    pub stripe_payment_id: String,

    /// Amount in cents
    pub amount: i64,

    /// Outcome
    pub status: PaymentStatus,
}

impl Payment {
    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<PaymentStatus> {
        PaymentStatus::from_str(&self.status)
    }

    /// Records a payment, inside a transaction
    ///
    /// A payment intent can fail and later succeed under the same provider
    /// ID, so a `completed` record promotes an existing non-completed row.
    /// Any other status only inserts.
    ///
    /// Returns `None` when nothing changed: the provider ID was already
    /// completed, or already recorded for a non-completed status.
    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        data: RecordPayment,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = match data.status {
            PaymentStatus::Completed => {
                r#"
                INSERT INTO payments (user_id, evaluation_id, stripe_payment_id, amount, status)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (stripe_payment_id) DO UPDATE
                SET status = EXCLUDED.status,
                    amount = EXCLUDED.amount
                WHERE payments.status <> 'completed'
                RETURNING id, user_id, evaluation_id, stripe_payment_id, amount, status, created_at
                "#
            }
            _ => {
                r#"
                INSERT INTO payments (user_id, evaluation_id, stripe_payment_id, amount, status)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (stripe_payment_id) DO NOTHING
                RETURNING id, user_id, evaluation_id, stripe_payment_id, amount, status, created_at
                "#
            }
        };

        let payment = sqlx::query_as::<_, Payment>(sql)
            .bind(data.user_id)
            .bind(data.evaluation_id)
            .bind(data.stripe_payment_id)
            .bind(data.amount)
            .bind(data.status.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(payment)
    }

    /// Finds a payment by the provider's payment ID
    pub async fn find_by_stripe_id(
        pool: &PgPool,
        stripe_payment_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, user_id, evaluation_id, stripe_payment_id, amount, status, created_at
            FROM payments
            WHERE stripe_payment_id = $1
            "#,
        )
        .bind(stripe_payment_id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Lists a user's payments, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, user_id, evaluation_id, stripe_payment_id, amount, status, created_at
            FROM payments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }
}
