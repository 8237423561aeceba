/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use codegrade_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = codegrade_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{rate_limit::RateLimiter, security::SecurityHeadersLayer},
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use codegrade_evaluator::providers::build_provider;
use codegrade_evaluator::{Evaluator, EvaluatorResult};
use codegrade_shared::auth::middleware::authenticate;
use codegrade_shared::billing::StripeClient;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// LLM evaluation pipeline
    pub evaluator: Evaluator,

    /// Payment provider client
    pub billing: StripeClient,

    /// Per-user evaluation rate limits
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates application state with the configured LLM provider
    ///
    /// # Errors
    ///
    /// Returns an error if the selected provider has no API key or its HTTP
    /// client cannot be built.
    pub fn new(db: PgPool, config: Config) -> EvaluatorResult<Self> {
        let provider = build_provider(&config.llm.provider_config())?;
        let evaluator = Evaluator::new(provider, config.llm.fallback_enabled);
        Ok(Self::with_evaluator(db, config, evaluator))
    }

    /// Creates application state around an existing evaluator
    pub fn with_evaluator(db: PgPool, config: Config, evaluator: Evaluator) -> Self {
        let billing = StripeClient::new(
            config.billing.stripe_secret_key.clone(),
            config.billing.api_base.clone(),
        );

        Self {
            db,
            config: Arc::new(config),
            evaluator,
            billing,
            rate_limiter: Arc::new(RateLimiter::new()),
        }
    }

    /// Gets the secret access tokens are verified with
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                    # Health check (public)
/// └── /v1/
///     ├── POST /payments/webhook     # Payment provider callback (signed)
///     └── (Bearer token required)
///         ├── GET|PATCH /profile
///         ├── POST /profile/plan
///         ├── GET|POST /tasks
///         ├── GET|DELETE /tasks/:id
///         ├── POST /evaluate
///         ├── GET /evaluations/:id
///         ├── GET /payments
///         ├── POST /payments/intent
///         └── GET /dashboard
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. CORS
/// 3. Compression
/// 4. Logging (tower-http TraceLayer)
/// 5. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{dashboard, evaluate, evaluations, health, payments, profile, tasks};

    let protected_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route("/profile/plan", post(profile::update_plan))
        .route("/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/tasks/:id", get(tasks::get_task).delete(tasks::delete_task))
        .route("/evaluate", post(evaluate::evaluate))
        .route("/evaluations/:id", get(evaluations::get_evaluation))
        .route("/payments", get(payments::list_payments))
        .route("/payments/intent", post(payments::create_payment_intent))
        .route("/dashboard", get(dashboard::get_dashboard))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let public_routes = Router::new().route("/payments/webhook", post(payments::webhook));

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Verifies the bearer token and injects `AuthContext` into request
/// extensions for the handlers.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = ?e, path = %req.uri().path(), "Authentication failed");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
