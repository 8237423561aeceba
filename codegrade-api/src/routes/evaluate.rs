/// Evaluation endpoint
///
/// Runs an AI review of one of the caller's tasks and stores the result.
///
/// # Endpoint
///
/// `POST /v1/evaluate`
///
/// # Flow
///
/// ```text
/// validate ─> load task (owner only) ─> rate limit ─> pending|failed|completed → evaluating
///     ─> LLM (or fallback report) ─> [tx: upsert evaluation, evaluating → completed]
///
/// any failure after the transition: evaluating → failed
/// ```
///
/// # Example Request
///
/// ```json
/// {
///   "task_id": "550e8400-e29b-41d4-a716-446655440000",
///   "title": "FizzBuzz",
///   "description": "Print the numbers 1 to 100...",
///   "code": "for i in 1..=100 { ... }"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "success": true,
///   "evaluation_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
///   "fallback": false
/// }
/// ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::routes::profile::current_profile;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use codegrade_evaluator::{EvaluationRequest, ReportTier};
use codegrade_shared::auth::middleware::AuthContext;
use codegrade_shared::models::evaluation::{Evaluation, NewEvaluation};
use codegrade_shared::models::task::Task;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Evaluate request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvaluateRequest {
    /// Task to evaluate
    pub task_id: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Task description
    #[validate(length(min = 1, max = 10000, message = "Description must be 1-10000 characters"))]
    pub description: String,

    /// Optional solution code
    #[validate(length(max = 100000, message = "Code must be at most 100000 characters"))]
    pub code: Option<String>,
}

/// Evaluate response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    /// Always true on success
    pub success: bool,

    /// Stored evaluation
    pub evaluation_id: Uuid,

    /// True when the stored report is a canned fallback
    pub fallback: bool,
}

/// Evaluate endpoint handler
///
/// # Errors
///
/// - 404 Not Found: no such task for this caller
/// - 409 Conflict: the task is already being evaluated
/// - 422 Unprocessable Entity: validation errors
/// - 429 Too Many Requests: evaluation rate limit exceeded
/// - 500 Internal Server Error: evaluation or storage failed (task marked failed)
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<EvaluateRequest>,
) -> ApiResult<Response> {
    request.validate()?;

    let task = Task::find_by_id_and_user(&state.db, request.task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let plan = current_profile(&state, &auth).await?.plan();
    let decision = state.rate_limiter.check(auth.user_id, plan).into_result()?;

    if Task::mark_evaluating(&state.db, task.id).await?.is_none() {
        return Err(ApiError::Conflict(
            "Task is already being evaluated".to_string(),
        ));
    }

    tracing::info!(
        task_id = %task.id,
        user_id = %auth.user_id,
        plan = plan.as_str(),
        "Evaluation started"
    );

    let eval_request = EvaluationRequest::new(request.title, request.description, request.code);
    let tier = ReportTier::from_plan(plan);

    // Detached: the task settles even if this request is dropped
    let (evaluation, fallback) = tokio::spawn(finish_evaluation(
        state.clone(),
        task.id,
        auth.user_id,
        eval_request,
        tier,
    ))
    .await
    .map_err(|e| ApiError::InternalError(format!("Evaluation of task {} aborted: {}", task.id, e)))??;

    tracing::info!(
        task_id = %task.id,
        evaluation_id = %evaluation.id,
        score = evaluation.score,
        fallback,
        "Evaluation stored"
    );

    let mut response = Json(EvaluateResponse {
        success: true,
        evaluation_id: evaluation.id,
        fallback,
    })
    .into_response();
    decision.apply_headers(&mut response);

    Ok(response)
}

/// Evaluates a claimed task and settles its status either way
async fn finish_evaluation(
    state: AppState,
    task_id: Uuid,
    user_id: Uuid,
    request: EvaluationRequest,
    tier: ReportTier,
) -> ApiResult<(Evaluation, bool)> {
    match run_evaluation(&state, task_id, &request, tier).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if let Err(mark_err) = Task::mark_failed(&state.db, task_id).await {
                tracing::error!(task_id = %task_id, error = %mark_err, "Failed to mark task failed");
            }
            tracing::error!(task_id = %task_id, user_id = %user_id, error = %e, "Evaluation failed");
            Err(ApiError::InternalError(format!("Evaluation of task {} failed: {}", task_id, e)))
        }
    }
}

async fn run_evaluation(
    state: &AppState,
    task_id: Uuid,
    request: &EvaluationRequest,
    tier: ReportTier,
) -> ApiResult<(Evaluation, bool)> {
    let outcome = state.evaluator.evaluate(request, tier).await?;
    let report = outcome.report;

    let mut tx = state.db.begin().await?;

    let evaluation = Evaluation::upsert(
        &mut tx,
        NewEvaluation {
            task_id,
            score: report.score,
            strengths: report.strengths,
            weaknesses: report.weaknesses,
            improvements: report.improvements,
            full_report: Some(report.full_report),
        },
    )
    .await?;

    Task::mark_completed(&mut tx, task_id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Task left the evaluating state".to_string()))?;

    tx.commit().await?;

    Ok((evaluation, outcome.fallback))
}
