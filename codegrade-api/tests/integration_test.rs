/// Integration tests for the CodeGrade API
///
/// The first group drives the router with an unreachable database and covers
/// every path that is decided before a query runs: authentication, webhook
/// signatures, validation, health degradation.
///
/// The second group needs PostgreSQL and is ignored by default.
/// Run with: cargo test --test integration_test -- --ignored --test-threads=1

mod common;

use axum::http::{Method, StatusCode};
use async_trait::async_trait;
use codegrade_evaluator::providers::mock::DEFAULT_RESPONSE;
use codegrade_evaluator::providers::{EvaluatorResult, LlmProvider, MockProvider, MockResponse};
use codegrade_evaluator::Evaluator;
use codegrade_shared::auth::jwt::{create_token, Claims};
use codegrade_shared::billing::events::{PAYMENT_FAILED, PAYMENT_SUCCEEDED};
use codegrade_shared::models::payment::Payment;
use codegrade_shared::models::profile::Profile;
use codegrade_shared::models::task::{Task, TaskStatus};
use common::{payment_event, serve_once, token_for, TestContext};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Provider that answers with the default report after a delay
struct SlowProvider(Duration);

#[async_trait]
impl LlmProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    fn model(&self) -> &str {
        "slow-model"
    }

    async fn generate(&self, _prompt: &str) -> EvaluatorResult<String> {
        tokio::time::sleep(self.0).await;
        Ok(DEFAULT_RESPONSE.to_string())
    }
}

// ---------------------------------------------------------------------------
// Database-independent paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_degraded_without_database() {
    let ctx = TestContext::offline();

    let (status, headers, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
    assert_eq!(body["llm_provider"], "mock");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::offline();

    for uri in ["/v1/profile", "/v1/tasks", "/v1/dashboard", "/v1/payments"] {
        let (status, _, body) = ctx.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_non_bearer_scheme_is_bad_request() {
    let ctx = TestContext::offline();

    let request = axum::http::Request::builder()
        .uri("/v1/profile")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request).await.unwrap();
    let (status, _, body) = common::read_response(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_invalid_tokens_are_unauthorized() {
    let ctx = TestContext::offline();
    let user_id = Uuid::new_v4();

    let wrong_secret = create_token(
        &Claims::new(user_id, None),
        "some-other-secret-that-is-long-enough",
    )
    .unwrap();
    let expired = create_token(
        &Claims::with_expiration(user_id, None, chrono::Duration::hours(-2)),
        common::JWT_SECRET,
    )
    .unwrap();

    for token in [wrong_secret.as_str(), expired.as_str(), "not-a-jwt"] {
        let (status, _, _) = ctx.send(Method::GET, "/v1/profile", Some(token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_evaluate_validation_errors() {
    let ctx = TestContext::offline();

    let (status, _, body) = ctx
        .authed(
            Method::POST,
            "/v1/evaluate",
            Some(json!({
                "task_id": Uuid::new_v4(),
                "title": "",
                "description": "Reverse a string"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "title");
}

#[tokio::test]
async fn test_create_task_validation_errors() {
    let ctx = TestContext::offline();

    let (status, _, body) = ctx
        .authed(
            Method::POST,
            "/v1/tasks",
            Some(json!({
                "title": "a".repeat(201),
                "description": ""
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["description", "title"]);
}

#[tokio::test]
async fn test_plan_change_for_other_user_is_forbidden() {
    let ctx = TestContext::offline();

    let (status, _, body) = ctx
        .authed(
            Method::POST,
            "/v1/profile/plan",
            Some(json!({ "plan": "Premium", "user_id": Uuid::new_v4() })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_unknown_plan_is_bad_request() {
    let ctx = TestContext::offline();

    let (status, _, body) = ctx
        .authed(Method::POST, "/v1/profile/plan", Some(json!({ "plan": "Platinum" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Platinum"));
}

#[tokio::test]
async fn test_webhook_without_signature_is_rejected() {
    let ctx = TestContext::offline();

    let (status, _, body) = ctx
        .send(
            Method::POST,
            "/v1/payments/webhook",
            None,
            Some(payment_event(PAYMENT_SUCCEEDED, "pi_1", Uuid::new_v4(), Uuid::new_v4())),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_webhook_with_wrong_signature_is_rejected() {
    let ctx = TestContext::offline();
    let event = payment_event(PAYMENT_SUCCEEDED, "pi_2", Uuid::new_v4(), Uuid::new_v4());
    let payload = event.to_string();
    let forged = codegrade_shared::billing::signature::sign_header(
        "whsec_attacker",
        now(),
        payload.as_bytes(),
    )
    .unwrap();

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/v1/payments/webhook")
        .header("Stripe-Signature", forged)
        .body(axum::body::Body::from(payload))
        .unwrap();
    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_with_stale_timestamp_is_rejected() {
    let ctx = TestContext::offline();
    let event = payment_event(PAYMENT_SUCCEEDED, "pi_3", Uuid::new_v4(), Uuid::new_v4());

    let (status, _, _) = ctx.post_webhook(&event, now() - 3600).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_with_extreme_timestamp_is_rejected() {
    let ctx = TestContext::offline();
    let payload = payment_event(PAYMENT_SUCCEEDED, "pi_4", Uuid::new_v4(), Uuid::new_v4()).to_string();

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/v1/payments/webhook")
        .header("Stripe-Signature", "t=-9223372036854775808,v1=00")
        .body(axum::body::Body::from(payload))
        .unwrap();
    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_ignores_unrelated_events() {
    let ctx = TestContext::offline();
    let event = json!({
        "id": "evt_unrelated",
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } }
    });

    let (status, _, body) = ctx.post_webhook(&event, now()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

// ---------------------------------------------------------------------------
// End-to-end flows (PostgreSQL)
// ---------------------------------------------------------------------------

async fn create_task(ctx: &TestContext, code: Option<&str>) -> Value {
    let (status, _, body) = ctx
        .authed(
            Method::POST,
            "/v1/tasks",
            Some(json!({
                "title": "Reverse a string",
                "description": "Write a function that reverses a UTF-8 string",
                "code": code
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

async fn evaluate(ctx: &TestContext, task: &Value) -> (StatusCode, axum::http::HeaderMap, Value) {
    ctx.authed(
        Method::POST,
        "/v1/evaluate",
        Some(json!({
            "task_id": task["id"],
            "title": task["title"],
            "description": task["description"],
            "code": task["code"]
        })),
    )
    .await
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_evaluation_purchase_flow() {
    let ctx = TestContext::with_database().await.unwrap();

    // Profile is created lazily on the free plan
    let (status, _, profile) = ctx.authed(Method::GET, "/v1/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["subscription_plan"], "Free");
    assert_eq!(profile["email"], ctx.email.as_str());

    let task = create_task(&ctx, Some("fn rev(s: &str) -> String { s.chars().rev().collect() }")).await;
    assert_eq!(task["status"], "pending");

    let (status, headers, body) = evaluate(&ctx, &task).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["fallback"], false);
    assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "5");
    assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "4");
    let evaluation_id: Uuid = serde_json::from_value(body["evaluation_id"].clone()).unwrap();

    let task_id: Uuid = serde_json::from_value(task["id"].clone()).unwrap();
    let stored = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert_eq!(stored.get_status(), Some(TaskStatus::Completed));

    // Free plan: report locked until paid
    let uri = format!("/v1/evaluations/{}", evaluation_id);
    let (status, _, evaluation) = ctx.authed(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(evaluation["score"], 78);
    assert_eq!(evaluation["report_locked"], true);
    assert!(evaluation["full_report"].is_null());

    // A failed attempt records a payment but unlocks nothing
    let failed = payment_event(PAYMENT_FAILED, "pi_flow", evaluation_id, ctx.user_id);
    let (status, _, _) = ctx.post_webhook(&failed, now()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, evaluation) = ctx.authed(Method::GET, &uri, None).await;
    assert_eq!(evaluation["report_locked"], true);

    // Verified success unlocks the report and raises the plan
    let succeeded = payment_event(PAYMENT_SUCCEEDED, "pi_flow", evaluation_id, ctx.user_id);
    let (status, _, body) = ctx.post_webhook(&succeeded, now()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);

    let (_, _, evaluation) = ctx.authed(Method::GET, &uri, None).await;
    assert_eq!(evaluation["is_paid"], true);
    assert_eq!(evaluation["report_locked"], false);
    assert!(evaluation["full_report"].is_string());

    let profile = Profile::find_by_id(&ctx.db, ctx.user_id).await.unwrap().unwrap();
    assert_eq!(profile.subscription_plan, "Premium");

    // Replay is a no-op
    let (status, _, _) = ctx.post_webhook(&succeeded, now()).await;
    assert_eq!(status, StatusCode::OK);
    let payments = Payment::list_by_user(&ctx.db, ctx.user_id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, "completed");

    let (status, _, listed) = ctx.authed(Method::GET, "/v1/payments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Already unlocked
    let (status, _, body) = ctx
        .authed(
            Method::POST,
            "/v1/payments/intent",
            Some(json!({ "evaluation_id": evaluation_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Report already unlocked");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_webhook_never_lowers_ultra_premium() {
    let ctx = TestContext::with_database().await.unwrap();

    let (status, _, body) = ctx
        .authed(
            Method::POST,
            "/v1/profile/plan",
            Some(json!({ "plan": "Ultra Premium", "user_id": ctx.user_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["plan"], "Ultra Premium");

    let task = create_task(&ctx, None).await;
    let (status, headers, body) = evaluate(&ctx, &task).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "60");
    let evaluation_id: Uuid = serde_json::from_value(body["evaluation_id"].clone()).unwrap();

    let event = payment_event(PAYMENT_SUCCEEDED, &format!("pi_{}", Uuid::new_v4().simple()), evaluation_id, ctx.user_id);
    let (status, _, _) = ctx.post_webhook(&event, now()).await;
    assert_eq!(status, StatusCode::OK);

    let profile = Profile::find_by_id(&ctx.db, ctx.user_id).await.unwrap().unwrap();
    assert_eq!(profile.subscription_plan, "Ultra Premium");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_other_users_resources_are_hidden() {
    let ctx = TestContext::with_database().await.unwrap();
    let task = create_task(&ctx, None).await;
    let (_, _, body) = evaluate(&ctx, &task).await;
    let evaluation_id = body["evaluation_id"].as_str().unwrap().to_string();
    let task_id = task["id"].as_str().unwrap().to_string();

    let intruder = Uuid::new_v4();
    let token = token_for(intruder, "intruder@example.com");

    let (status, _, _) = ctx
        .send(Method::GET, &format!("/v1/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = ctx
        .send(Method::DELETE, &format!("/v1/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = ctx
        .send(Method::GET, &format!("/v1/evaluations/{}", evaluation_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = ctx
        .send(
            Method::POST,
            "/v1/payments/intent",
            Some(&token),
            Some(json!({ "evaluation_id": evaluation_id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = ctx
        .send(
            Method::POST,
            "/v1/evaluate",
            Some(&token),
            Some(json!({
                "task_id": task_id,
                "title": "Reverse a string",
                "description": "Steal an evaluation"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = ctx
        .authed(Method::GET, &format!("/v1/evaluations/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_failed_evaluation_marks_task_failed() {
    let provider = Arc::new(MockProvider::with_script(vec![
        MockResponse::Fail("upstream timeout".to_string()),
        MockResponse::Text(DEFAULT_RESPONSE.to_string()),
    ]));
    let ctx = TestContext::with_database_and(Evaluator::new(provider, false), "http://127.0.0.1:1")
        .await
        .unwrap();

    let task = create_task(&ctx, Some("print('hi')")).await;
    let task_id: Uuid = serde_json::from_value(task["id"].clone()).unwrap();

    let (status, _, body) = evaluate(&ctx, &task).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An internal error occurred");
    let stored = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert_eq!(stored.get_status(), Some(TaskStatus::Failed));

    // Retry from failed succeeds
    let (status, _, _) = evaluate(&ctx, &task).await;
    assert_eq!(status, StatusCode::OK);
    let stored = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert_eq!(stored.get_status(), Some(TaskStatus::Completed));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_fallback_report_when_provider_fails() {
    let provider = Arc::new(MockProvider::with_script(vec![MockResponse::Text(
        "I am unable to produce JSON today.".to_string(),
    )]));
    let ctx = TestContext::with_database_and(Evaluator::new(provider, true), "http://127.0.0.1:1")
        .await
        .unwrap();

    let task = create_task(&ctx, Some("fn main() {}")).await;
    let (status, _, body) = evaluate(&ctx, &task).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], true);

    let uri = format!("/v1/evaluations/{}", body["evaluation_id"].as_str().unwrap());
    let (_, _, evaluation) = ctx.authed(Method::GET, &uri, None).await;
    let score = evaluation["score"].as_i64().unwrap();
    assert!((65..=89).contains(&score));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_rate_limit_blocks_sixth_free_evaluation() {
    let ctx = TestContext::with_database().await.unwrap();
    let task = create_task(&ctx, None).await;

    for _ in 0..5 {
        let (status, _, _) = evaluate(&ctx, &task).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = evaluate(&ctx, &task).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limit_exceeded");
    assert!(headers.get("retry-after").is_some());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_task_listing_and_dashboard() {
    let ctx = TestContext::with_database().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..7 {
        tasks.push(create_task(&ctx, None).await);
    }
    evaluate(&ctx, &tasks[0]).await;
    evaluate(&ctx, &tasks[1]).await;

    let (status, _, page) = ctx.authed(Method::GET, "/v1/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 7);
    assert_eq!(page["per_page"], 5);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["tasks"].as_array().unwrap().len(), 5);

    let (_, _, page) = ctx.authed(Method::GET, "/v1/tasks?page=2&per_page=5", None).await;
    assert_eq!(page["tasks"].as_array().unwrap().len(), 2);

    let (status, _, dashboard) = ctx.authed(Method::GET, "/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_tasks"], 7);
    assert_eq!(dashboard["completed_tasks"], 2);
    assert_eq!(dashboard["total_evaluations"], 2);
    assert_eq!(dashboard["average_score"], 78);
    assert_eq!(dashboard["plan"], "Free");

    let uri = format!("/v1/tasks/{}", tasks[6]["id"].as_str().unwrap());
    let (status, _, _) = ctx.authed(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = ctx.authed(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_payment_intent_created_with_provider() {
    let stripe = serve_once(
        "200 OK",
        json!({
            "id": "pi_intent_test",
            "amount": 499,
            "currency": "usd",
            "status": "requires_payment_method",
            "client_secret": "pi_intent_test_secret_abc",
            "metadata": {}
        })
        .to_string(),
    )
    .await;
    let ctx = TestContext::with_database_and(
        Evaluator::new(Arc::new(MockProvider::new()), true),
        &stripe,
    )
    .await
    .unwrap();

    let task = create_task(&ctx, None).await;
    let (_, _, body) = evaluate(&ctx, &task).await;

    let (status, _, intent) = ctx
        .authed(
            Method::POST,
            "/v1/payments/intent",
            Some(json!({ "evaluation_id": body["evaluation_id"] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", intent);
    assert_eq!(intent["client_secret"], "pi_intent_test_secret_abc");
    assert_eq!(intent["amount"], 499);
    assert_eq!(intent["currency"], "usd");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_first_request_creating_task_creates_profile() {
    let ctx = TestContext::with_database().await.unwrap();
    assert!(Profile::find_by_id(&ctx.db, ctx.user_id).await.unwrap().is_none());

    let (status, _, body) = ctx
        .authed(
            Method::POST,
            "/v1/tasks",
            Some(json!({ "title": "T", "description": "D" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let profile = Profile::find_by_id(&ctx.db, ctx.user_id).await.unwrap().unwrap();
    assert_eq!(profile.subscription_plan, "Free");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_huge_page_number_returns_empty_page() {
    let ctx = TestContext::with_database().await.unwrap();
    create_task(&ctx, None).await;

    let (status, _, page) = ctx
        .authed(Method::GET, "/v1/tasks?page=9223372036854775807", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert!(page["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_dropped_evaluate_request_still_settles_task() {
    let provider = Arc::new(SlowProvider(Duration::from_millis(500)));
    let ctx = TestContext::with_database_and(Evaluator::new(provider, false), "http://127.0.0.1:1")
        .await
        .unwrap();

    let task = create_task(&ctx, Some("fn main() {}")).await;
    let task_id: Uuid = serde_json::from_value(task["id"].clone()).unwrap();

    // Client gives up while the provider is still working
    let abandoned = tokio::time::timeout(Duration::from_millis(100), evaluate(&ctx, &task)).await;
    assert!(abandoned.is_err());

    let mut status = None;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        status = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap().get_status();
        if status != Some(TaskStatus::Evaluating) {
            break;
        }
    }
    assert_eq!(status, Some(TaskStatus::Completed));

    let (status, _, body) = evaluate(&ctx, &task).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
}
