/// Dashboard summary endpoint
///
/// `GET /v1/dashboard`
///
/// ```json
/// {
///   "total_tasks": 12,
///   "completed_tasks": 9,
///   "total_evaluations": 9,
///   "average_score": 78,
///   "plan": "Free"
/// }
/// ```

use crate::app::AppState;
use crate::error::ApiResult;
use crate::routes::profile::current_profile;
use axum::{extract::State, Extension, Json};
use codegrade_shared::auth::middleware::AuthContext;
use codegrade_shared::models::evaluation::Evaluation;
use codegrade_shared::models::profile::SubscriptionPlan;
use codegrade_shared::models::task::{Task, TaskStatus};
use serde::{Deserialize, Serialize};

/// Dashboard figures for the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Tasks submitted
    pub total_tasks: i64,

    /// Tasks whose latest evaluation succeeded
    pub completed_tasks: i64,

    /// Evaluations stored
    pub total_evaluations: i64,

    /// Rounded mean score, 0 without evaluations
    pub average_score: i64,

    /// Current plan
    pub plan: SubscriptionPlan,
}

/// Returns the caller's dashboard figures
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardResponse>> {
    let profile = current_profile(&state, &auth).await?;

    let total_tasks = Task::count_by_user(&state.db, auth.user_id).await?;
    let completed_tasks =
        Task::count_by_status(&state.db, auth.user_id, TaskStatus::Completed).await?;
    let stats = Evaluation::stats_for_user(&state.db, auth.user_id).await?;

    Ok(Json(DashboardResponse {
        total_tasks,
        completed_tasks,
        total_evaluations: stats.total_evaluations,
        average_score: stats.rounded_average(),
        plan: profile.plan(),
    }))
}
