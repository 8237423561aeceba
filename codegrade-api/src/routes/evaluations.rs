/// Evaluation read endpoint
///
/// `GET /v1/evaluations/:id`
///
/// The summary (score, strengths, weaknesses, improvements) is always
/// visible to the owner. The full report is visible once it has been paid
/// for, or to any caller on a plan that unlocks all reports; otherwise
/// `full_report` is null and `report_locked` is true.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::routes::profile::current_profile;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use codegrade_shared::auth::middleware::AuthContext;
use codegrade_shared::models::evaluation::Evaluation;
use codegrade_shared::models::profile::SubscriptionPlan;
use codegrade_shared::models::task::Task;
use serde::Serialize;
use uuid::Uuid;

/// Evaluation as shown to its owner
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResponse {
    /// Evaluation ID
    pub id: Uuid,

    /// Evaluated task ID
    pub task_id: Uuid,

    /// Score from 0 to 100
    pub score: i32,

    /// Strengths
    pub strengths: Vec<String>,

    /// Weaknesses
    pub weaknesses: Vec<String>,

    /// Improvements
    pub improvements: Vec<String>,

    /// Full report, null while locked
    pub full_report: Option<String>,

    /// Whether the report was purchased
    pub is_paid: bool,

    /// Whether the full report is withheld
    pub report_locked: bool,

    /// When the evaluation was stored
    pub created_at: DateTime<Utc>,

    /// The evaluated task
    pub task: Task,
}

impl EvaluationResponse {
    /// Builds the owner's view, withholding the report when locked
    pub fn for_viewer(evaluation: Evaluation, task: Task, plan: SubscriptionPlan) -> Self {
        let report_locked = !(evaluation.is_paid || plan.unlocks_all_reports());

        Self {
            id: evaluation.id,
            task_id: evaluation.task_id,
            score: evaluation.score,
            strengths: evaluation.strengths,
            weaknesses: evaluation.weaknesses,
            improvements: evaluation.improvements,
            full_report: if report_locked { None } else { evaluation.full_report },
            is_paid: evaluation.is_paid,
            report_locked,
            created_at: evaluation.created_at,
            task,
        }
    }
}

/// Returns one evaluation of the caller's
///
/// # Errors
///
/// - 404 Not Found: no such evaluation
/// - 403 Forbidden: the evaluation belongs to another user
pub async fn get_evaluation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(evaluation_id): Path<Uuid>,
) -> ApiResult<Json<EvaluationResponse>> {
    let evaluation = Evaluation::find_by_id(&state.db, evaluation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evaluation not found".to_string()))?;

    let task = Task::find_by_id(&state.db, evaluation.task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evaluation not found".to_string()))?;

    if task.user_id != auth.user_id {
        tracing::warn!(
            evaluation_id = %evaluation_id,
            user_id = %auth.user_id,
            "Rejected access to another user's evaluation"
        );
        return Err(ApiError::Forbidden("Not your evaluation".to_string()));
    }

    let plan = current_profile(&state, &auth).await?.plan();

    Ok(Json(EvaluationResponse::for_viewer(evaluation, task, plan)))
}
