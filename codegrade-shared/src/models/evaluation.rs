/// Evaluation model and database operations
///
/// Each task has at most one evaluation (`UNIQUE(task_id)`). Re-evaluating a
/// task overwrites the stored result in place and keeps its `is_paid` flag,
/// so a purchased report stays unlocked.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE evaluations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     score INTEGER NOT NULL,
///     strengths TEXT[] NOT NULL DEFAULT '{}',
///     weaknesses TEXT[] NOT NULL DEFAULT '{}',
///     improvements TEXT[] NOT NULL DEFAULT '{}',
///     full_report TEXT,
///     is_paid BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT evaluations_task_unique UNIQUE (task_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Stored evaluation of a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Evaluation {
    /// Unique evaluation ID
    pub id: Uuid,

    /// Evaluated task
    pub task_id: Uuid,

    /// Score from 0 to 100
    pub score: i32,

    /// What the submission does well
    pub strengths: Vec<String>,

    /// Where it falls short
    pub weaknesses: Vec<String>,

    /// Suggested next steps
    pub improvements: Vec<String>,

    /// Long-form report, the paid part
    pub full_report: Option<String>,

    /// Whether the full report was purchased
    pub is_paid: bool,

    /// When the latest result was stored
    pub created_at: DateTime<Utc>,
}

/// Input for storing an evaluation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvaluation {
    /// Evaluated task
    pub task_id: Uuid,

    /// Score from 0 to 100
    pub score: i32,

    /// Strengths
    pub strengths: Vec<String>,

    /// Weaknesses
    pub weaknesses: Vec<String>,

    /// Improvements
    pub improvements: Vec<String>,

    /// Full report
    pub full_report: Option<String>,
}

/// Aggregate evaluation figures for one user's dashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EvaluationStats {
    /// Number of evaluated tasks
    pub total_evaluations: i64,

    /// Mean score, `None` when nothing has been evaluated
    pub average_score: Option<f64>,
}

impl EvaluationStats {
    /// Mean score rounded to the nearest integer, 0 without evaluations
    pub fn rounded_average(&self) -> i64 {
        self.average_score.map(|avg| avg.round() as i64).unwrap_or(0)
    }
}

impl Evaluation {
    /// Inserts or replaces the evaluation of `data.task_id`, inside a transaction
    ///
    /// On conflict the result columns are overwritten and `is_paid` is kept.
    pub async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        data: NewEvaluation,
    ) -> Result<Self, sqlx::Error> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            INSERT INTO evaluations (task_id, score, strengths, weaknesses, improvements, full_report)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (task_id) DO UPDATE
            SET score = EXCLUDED.score,
                strengths = EXCLUDED.strengths,
                weaknesses = EXCLUDED.weaknesses,
                improvements = EXCLUDED.improvements,
                full_report = EXCLUDED.full_report,
                created_at = NOW()
            RETURNING id, task_id, score, strengths, weaknesses, improvements,
                      full_report, is_paid, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.score)
        .bind(data.strengths)
        .bind(data.weaknesses)
        .bind(data.improvements)
        .bind(data.full_report)
        .fetch_one(&mut **tx)
        .await?;

        Ok(evaluation)
    }

    /// Finds an evaluation by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            SELECT id, task_id, score, strengths, weaknesses, improvements,
                   full_report, is_paid, created_at
            FROM evaluations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(evaluation)
    }

    /// Finds the evaluation of a task
    pub async fn find_by_task(pool: &PgPool, task_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            SELECT id, task_id, score, strengths, weaknesses, improvements,
                   full_report, is_paid, created_at
            FROM evaluations
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        Ok(evaluation)
    }

    /// Returns the owner of the evaluated task, `None` if the evaluation is gone
    pub async fn owner_id(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let owner: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT t.user_id
            FROM evaluations e
            JOIN tasks t ON t.id = e.task_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(owner.map(|(user_id,)| user_id))
    }

    /// Unlocks the full report, inside a transaction
    ///
    /// Setting the flag again is harmless. Returns `None` for an unknown ID.
    pub async fn mark_paid(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            UPDATE evaluations
            SET is_paid = TRUE
            WHERE id = $1
            RETURNING id, task_id, score, strengths, weaknesses, improvements,
                      full_report, is_paid, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(evaluation)
    }

    /// Evaluation count and mean score across a user's tasks
    pub async fn stats_for_user(pool: &PgPool, user_id: Uuid) -> Result<EvaluationStats, sqlx::Error> {
        let stats = sqlx::query_as::<_, EvaluationStats>(
            r#"
            SELECT COUNT(e.id) AS total_evaluations,
                   AVG(e.score)::FLOAT8 AS average_score
            FROM evaluations e
            JOIN tasks t ON t.id = e.task_id
            WHERE t.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }
}
