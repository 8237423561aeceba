/// Profile model and database operations
///
/// One profile exists per identity-provider user. The row is keyed by the
/// user's id (the token `sub`) and is created lazily the first time an
/// authenticated request needs it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY,
///     email VARCHAR(320) NOT NULL,
///     full_name VARCHAR(255),
///     subscription_plan VARCHAR(32) NOT NULL DEFAULT 'Free',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT profiles_plan_check CHECK (
///         subscription_plan IN ('Free', 'Premium', 'Ultra Premium')
///     )
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use codegrade_shared::models::profile::{Profile, SubscriptionPlan};
/// use codegrade_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new("postgresql://localhost/codegrade")).await?;
///
/// let profile = Profile::get_or_create(&pool, Uuid::new_v4(), "dev@example.com").await?;
/// assert_eq!(profile.get_plan(), Some(SubscriptionPlan::Free));
///
/// Profile::update_plan(&pool, profile.id, SubscriptionPlan::Premium).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Subscription plan
///
/// Stored as its display name (`Free`, `Premium`, `Ultra Premium`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionPlan {
    /// Default plan; full reports are unlocked per evaluation
    #[serde(rename = "Free")]
    Free,

    /// All full reports unlocked
    #[serde(rename = "Premium")]
    Premium,

    /// All full reports unlocked, comprehensive analysis
    #[serde(rename = "Ultra Premium")]
    UltraPremium,
}

impl SubscriptionPlan {
    /// Converts plan to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "Free",
            SubscriptionPlan::Premium => "Premium",
            SubscriptionPlan::UltraPremium => "Ultra Premium",
        }
    }

    /// Parses plan from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Free" => Some(SubscriptionPlan::Free),
            "Premium" => Some(SubscriptionPlan::Premium),
            "Ultra Premium" => Some(SubscriptionPlan::UltraPremium),
            _ => None,
        }
    }

    /// Ordering used when raising a plan: Free < Premium < Ultra Premium
    pub fn rank(&self) -> u8 {
        match self {
            SubscriptionPlan::Free => 0,
            SubscriptionPlan::Premium => 1,
            SubscriptionPlan::UltraPremium => 2,
        }
    }

    /// Whether every full report is readable without a per-report payment
    pub fn unlocks_all_reports(&self) -> bool {
        !matches!(self, SubscriptionPlan::Free)
    }
}

impl Default for SubscriptionPlan {
    fn default() -> Self {
        SubscriptionPlan::Free
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of a signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// User ID (identity provider subject)
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub full_name: Option<String>,

    /// Current plan (see [`SubscriptionPlan`])
    pub subscription_plan: String,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Gets the parsed plan enum
    pub fn get_plan(&self) -> Option<SubscriptionPlan> {
        SubscriptionPlan::from_str(&self.subscription_plan)
    }

    /// Parsed plan, treating an unknown value as `Free`
    pub fn plan(&self) -> SubscriptionPlan {
        self.get_plan().unwrap_or_default()
    }

    /// Finds a profile by user ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, subscription_plan, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Returns the user's profile, creating a `Free` one if absent
    ///
    /// Concurrent first requests race on the primary key; the insert is a
    /// no-op for the loser, which then reads the winner's row.
    pub async fn get_or_create(pool: &PgPool, id: Uuid, email: &str) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            WITH inserted AS (
                INSERT INTO profiles (id, email, subscription_plan)
                VALUES ($1, $2, 'Free')
                ON CONFLICT (id) DO NOTHING
                RETURNING id, email, full_name, subscription_plan, created_at, updated_at
            )
            SELECT id, email, full_name, subscription_plan, created_at, updated_at FROM inserted
            UNION ALL
            SELECT id, email, full_name, subscription_plan, created_at, updated_at
            FROM profiles
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_optional(pool)
        .await?;

        match profile {
            Some(profile) => Ok(profile),
            // Row committed by a concurrent request after our snapshot
            None => Self::find_by_id(pool, id)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Updates the display name
    pub async fn update_name(
        pool: &PgPool,
        id: Uuid,
        full_name: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET full_name = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, full_name, subscription_plan, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(full_name)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Sets the plan unconditionally
    pub async fn update_plan(
        pool: &PgPool,
        id: Uuid,
        plan: SubscriptionPlan,
    ) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET subscription_plan = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, full_name, subscription_plan, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(plan.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Raises the plan to at least `plan`, inside a transaction
    ///
    /// A profile already on an equal or higher plan is left untouched.
    /// Returns `true` when the row changed.
    pub async fn raise_plan(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        plan: SubscriptionPlan,
    ) -> Result<bool, sqlx::Error> {
        let lower: Vec<&'static str> = [
            SubscriptionPlan::Free,
            SubscriptionPlan::Premium,
            SubscriptionPlan::UltraPremium,
        ]
        .iter()
        .filter(|p| p.rank() < plan.rank())
        .map(|p| p.as_str())
        .collect();

        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET subscription_plan = $2,
                updated_at = NOW()
            WHERE id = $1 AND subscription_plan = ANY($3)
            "#,
        )
        .bind(id)
        .bind(plan.as_str())
        .bind(lower)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
