/// Task endpoints
///
/// A task is a coding exercise submitted for evaluation. It starts out
/// `pending` and is moved through its states by `POST /v1/evaluate`.
///
/// # Endpoints
///
/// ```text
/// POST   /v1/tasks                      # create a task
/// GET    /v1/tasks?page=1&per_page=5    # list the caller's tasks
/// GET    /v1/tasks/:id                  # one task
/// DELETE /v1/tasks/:id                  # delete a task and its evaluation
/// ```
///
/// # Example Request
///
/// ```json
/// {
///   "title": "FizzBuzz",
///   "description": "Print the numbers 1 to 100...",
///   "code": "for i in 1..=100 { ... }"
/// }
/// ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::routes::profile::current_profile;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use codegrade_shared::auth::middleware::AuthContext;
use codegrade_shared::models::evaluation::Evaluation;
use codegrade_shared::models::task::{CreateTask, Task, TaskWithEvaluation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for task listings
pub const DEFAULT_PER_PAGE: i64 = 5;

/// Largest accepted page size
pub const MAX_PER_PAGE: i64 = 50;

/// Highest page number accepted; larger values are clamped
pub const MAX_PAGE: i64 = 1_000_000;

/// Create task request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// What the code is supposed to do
    #[validate(length(min = 1, max = 10000, message = "Description must be 1-10000 characters"))]
    pub description: String,

    /// Optional solution code
    #[validate(length(max = 100000, message = "Code must be at most 100000 characters"))]
    pub code: Option<String>,
}

/// Pagination query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksQuery {
    /// 1-based page number
    pub page: Option<i64>,

    /// Page size
    pub per_page: Option<i64>,
}

impl ListTasksQuery {
    /// Page and page size after defaults and clamping
    pub fn resolve(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page)
    }
}

/// One page of tasks
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    /// Tasks on this page, newest first
    pub tasks: Vec<TaskWithEvaluation>,

    /// Current page
    pub page: i64,

    /// Page size
    pub per_page: i64,

    /// Total number of tasks
    pub total: i64,

    /// Total number of pages
    pub total_pages: i64,
}

/// A task with its evaluation, if any
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetailResponse {
    /// The task
    #[serde(flatten)]
    pub task: Task,

    /// Evaluation summary
    pub evaluation: Option<EvaluationSummary>,
}

/// Evaluation fields safe to show next to a task
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    /// Evaluation ID
    pub id: Uuid,

    /// Score from 0 to 100
    pub score: i32,

    /// Whether the full report was purchased
    pub is_paid: bool,
}

impl From<Evaluation> for EvaluationSummary {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            id: evaluation.id,
            score: evaluation.score,
            is_paid: evaluation.is_paid,
        }
    }
}

/// Number of pages needed for `total` items
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + per_page - 1) / per_page
    }
}

/// Creates a `pending` task for the caller
///
/// # Errors
///
/// - 422 Unprocessable Entity: validation errors
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    request.validate()?;

    // tasks.user_id references profiles
    current_profile(&state, &auth).await?;

    let code = request.code.filter(|c| !c.trim().is_empty());

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            title: request.title,
            description: request.description,
            code,
        },
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = %auth.user_id, "Failed to create task");
        ApiError::InternalError("Failed to create task".to_string())
    })?;

    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists the caller's tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let (page, per_page) = query.resolve();
    let offset = (page - 1) * per_page;

    let total = Task::count_by_user(&state.db, auth.user_id).await?;
    let tasks = Task::list_by_user(&state.db, auth.user_id, per_page, offset).await?;

    Ok(Json(TaskListResponse {
        tasks,
        page,
        per_page,
        total,
        total_pages: total_pages(total, per_page),
    }))
}

/// Returns one of the caller's tasks
///
/// # Errors
///
/// - 404 Not Found: no such task for this caller
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskDetailResponse>> {
    let task = Task::find_by_id_and_user(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let evaluation = Evaluation::find_by_task(&state.db, task.id).await?;

    Ok(Json(TaskDetailResponse {
        task,
        evaluation: evaluation.map(EvaluationSummary::from),
    }))
}

/// Deletes one of the caller's tasks
///
/// # Errors
///
/// - 404 Not Found: no such task for this caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete_for_user(&state.db, task_id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = %task_id, user_id = %auth.user_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
