//! # CodeGrade API Server
//!
//! HTTP API for AI code evaluation: users submit coding tasks, receive a
//! scored review from an LLM, and buy the full report through the payment
//! provider.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Profile, task, evaluation and dashboard endpoints
//! - Bearer token verification for the external identity provider
//! - Per-user evaluation rate limiting
//! - Payment intents and a signed payment webhook
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p codegrade-api
//! ```

use codegrade_api::{
    app::{build_router, AppState},
    config::Config,
};
use codegrade_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "codegrade_api=debug,codegrade_evaluator=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "CodeGrade API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let mut db_config = DatabaseConfig::new(config.database.url.clone());
    db_config.max_connections = config.database.max_connections;
    let pool = create_pool(db_config).await?;

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    tracing::info!(
        provider = %config.llm.provider,
        fallback = config.llm.fallback_enabled,
        "LLM provider configured"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
