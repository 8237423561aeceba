/// Task model and database operations
///
/// A task is a coding exercise a user submits for evaluation: a title, a
/// description and optionally the code itself.
///
/// # State Machine
///
/// ```text
/// pending   → evaluating
/// failed    → evaluating   (retry)
/// completed → evaluating   (re-evaluate)
/// evaluating → completed
///            → failed
/// ```
///
/// Transitions are guarded in SQL, so an update from an unexpected state
/// matches no row and returns `None`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     code TEXT,
///     status VARCHAR(16) NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use codegrade_shared::models::task::{Task, CreateTask};
/// use codegrade_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new("postgresql://localhost/codegrade")).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     user_id: Uuid::new_v4(),
///     title: "FizzBuzz".to_string(),
///     description: "Print 1..100 with the usual substitutions".to_string(),
///     code: Some("for i in 1..=100 { /* ... */ }".to_string()),
/// }).await?;
///
/// // Claim it for evaluation
/// Task::mark_evaluating(&pool, task.id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Task evaluation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Submitted, never evaluated
    Pending,

    /// An evaluation attempt is in flight
    Evaluating,

    /// The latest attempt produced an evaluation
    Completed,

    /// The latest attempt failed
    Failed,
}

impl TaskStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Evaluating => "evaluating",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Parses status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "evaluating" => Some(TaskStatus::Evaluating),
            "completed" => Some(TaskStatus::Completed),
            "failed" => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    /// Every status, in lifecycle order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::Evaluating,
        TaskStatus::Completed,
        TaskStatus::Failed,
    ];

    /// Checks if transition to target status is valid
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            // Any settled task may be (re-)evaluated
            (TaskStatus::Pending, TaskStatus::Evaluating) => true,
            (TaskStatus::Failed, TaskStatus::Evaluating) => true,
            (TaskStatus::Completed, TaskStatus::Evaluating) => true,

            // An attempt settles either way
            (TaskStatus::Evaluating, TaskStatus::Completed) => true,
            (TaskStatus::Evaluating, TaskStatus::Failed) => true,

            _ => false,
        }
    }

    /// Statuses from which `target` may be entered
    pub fn sources_of(target: TaskStatus) -> Vec<String> {
        TaskStatus::ALL
            .iter()
            .filter(|from| from.can_transition_to(target))
            .map(|from| from.as_str().to_string())
            .collect()
    }
}

/// Task model representing a submitted exercise
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Short title
    pub title: String,

    /// What the exercise asks for
    pub description: String,

    /// Submitted code, if any
    pub code: Option<String>,

    /// Current status (see [`TaskStatus`])
    pub status: String,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Task row joined with a summary of its evaluation, for listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskWithEvaluation {
    /// The task itself
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,

    /// Evaluation ID, when the task has been evaluated
    pub evaluation_id: Option<Uuid>,

    /// Evaluation score
    pub score: Option<i32>,

    /// Whether the full report has been purchased
    pub is_paid: Option<bool>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owner
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Optional code
    pub code: Option<String>,
}

impl Task {
    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<TaskStatus> {
        TaskStatus::from_str(&self.status)
    }

    /// Creates a new task in pending status
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// owner has no profile row yet.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, code)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, code, status, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.code)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, code, status, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, restricted to its owner
    ///
    /// This is the lookup API endpoints use, so another user's task is
    /// indistinguishable from a missing one.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, code, status, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Moves a task to `target` if its current status allows it
    async fn transition<'e, E>(
        executor: E,
        id: Uuid,
        target: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2,
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($3)
            RETURNING id, user_id, title, description, code, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(target.as_str())
        .bind(TaskStatus::sources_of(target))
        .fetch_optional(executor)
        .await
    }

    /// Transitions task to evaluating status
    ///
    /// Returns `None` when the task is already being evaluated.
    pub async fn mark_evaluating(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        Self::transition(pool, id, TaskStatus::Evaluating).await
    }

    /// Transitions task to completed status, inside a transaction
    pub async fn mark_completed(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        Self::transition(&mut **tx, id, TaskStatus::Completed).await
    }

    /// Transitions task to failed status
    pub async fn mark_failed(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        Self::transition(pool, id, TaskStatus::Failed).await
    }

    /// Lists a user's tasks, newest first, with their evaluation summary
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskWithEvaluation>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithEvaluation>(
            r#"
            SELECT t.id, t.user_id, t.title, t.description, t.code, t.status,
                   t.created_at, t.updated_at,
                   e.id AS evaluation_id, e.score, e.is_paid
            FROM tasks t
            LEFT JOIN evaluations e ON e.task_id = t.id
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts a user's tasks
    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts a user's tasks in one status
    pub async fn count_by_status(
        pool: &PgPool,
        user_id: Uuid,
        status: TaskStatus,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND status = $2")
                .bind(user_id)
                .bind(status.as_str())
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Deletes a task owned by `user_id`
    ///
    /// Its evaluation (and that evaluation's payments) cascade. Returns
    /// `true` if a row was deleted.
    pub async fn delete_for_user(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
