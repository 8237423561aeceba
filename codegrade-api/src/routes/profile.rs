/// Profile endpoints
///
/// # Endpoints
///
/// ```text
/// GET   /v1/profile        # caller's profile (created on first access)
/// PATCH /v1/profile        # update display name
/// POST  /v1/profile/plan   # change subscription plan
/// ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, Extension, Json};
use codegrade_shared::auth::middleware::AuthContext;
use codegrade_shared::models::profile::{Profile, SubscriptionPlan};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Loads the caller's profile, creating a `Free` one on first access
pub(crate) async fn current_profile(state: &AppState, auth: &AuthContext) -> ApiResult<Profile> {
    Profile::get_or_create(&state.db, auth.user_id, auth.email_or_empty())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %auth.user_id, "Failed to load profile");
            ApiError::InternalError("Failed to load profile".to_string())
        })
}

/// Update profile request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name; blank or null clears it
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

/// Plan change request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanRequest {
    /// Target plan (`Free`, `Premium` or `Ultra Premium`)
    pub plan: String,

    /// Optional user ID; must be the caller when present
    pub user_id: Option<Uuid>,
}

/// Plan change response
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePlanResponse {
    /// Always true on success
    pub success: bool,

    /// New plan
    pub plan: SubscriptionPlan,

    /// Updated profile
    pub profile: Profile,
}

/// Returns the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(current_profile(&state, &auth).await?))
}

/// Updates the caller's display name
///
/// # Errors
///
/// - 422 Unprocessable Entity: name too long
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    request.validate()?;

    current_profile(&state, &auth).await?;

    let full_name = request
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let profile = Profile::update_name(&state.db, auth.user_id, full_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, "Profile updated");

    Ok(Json(profile))
}

/// Changes the caller's subscription plan
///
/// The plan is set as requested, including downgrades. Paid upgrades
/// through the payment webhook only ever raise the plan.
///
/// # Errors
///
/// - 400 Bad Request: unknown plan name
/// - 403 Forbidden: `user_id` names someone other than the caller
pub async fn update_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdatePlanRequest>,
) -> ApiResult<Json<UpdatePlanResponse>> {
    if let Some(user_id) = request.user_id {
        if user_id != auth.user_id {
            tracing::warn!(
                user_id = %auth.user_id,
                target_user_id = %user_id,
                "Rejected plan change for another user"
            );
            return Err(ApiError::Forbidden(
                "Cannot change another user's plan".to_string(),
            ));
        }
    }

    let plan = SubscriptionPlan::from_str(request.plan.trim())
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid plan: {}", request.plan)))?;

    current_profile(&state, &auth).await?;

    let profile = Profile::update_plan(&state.db, auth.user_id, plan)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, plan = plan.as_str(), "Subscription plan changed");

    Ok(Json(UpdatePlanResponse {
        success: true,
        plan,
        profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_validation() {
        let valid = UpdateProfileRequest {
            full_name: Some("Ada Lovelace".to_string()),
        };
        assert!(valid.validate().is_ok());

        let cleared = UpdateProfileRequest { full_name: None };
        assert!(cleared.validate().is_ok());

        let too_long = UpdateProfileRequest {
            full_name: Some("a".repeat(256)),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_plan_request_deserializes_without_user() {
        let request: UpdatePlanRequest =
            serde_json::from_str(r#"{"plan": "Ultra Premium"}"#).unwrap();
        assert_eq!(request.plan, "Ultra Premium");
        assert!(request.user_id.is_none());
    }
}
