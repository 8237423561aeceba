/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default: 0.0.0.0:8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `RUN_MIGRATIONS`: apply migrations at startup (default: true)
/// - `AUTH_JWT_SECRET`: identity provider signing secret (required, >= 32 chars)
/// - `LLM_PROVIDER`: `gemini`, `openai` or `mock` (default: gemini)
/// - `GEMINI_API_KEY` / `GEMINI_MODEL` (default model: gemini-pro)
/// - `OPENAI_API_KEY` / `OPENAI_MODEL` (default model: gpt-3.5-turbo)
/// - `LLM_BASE_URL`: override the provider endpoint
/// - `LLM_TIMEOUT_SECS`: per-request timeout (default: 60)
/// - `EVALUATION_FALLBACK`: canned report on provider failure (default: true)
/// - `STRIPE_SECRET_KEY` / `STRIPE_WEBHOOK_SECRET`: payment provider secrets (required)
/// - `STRIPE_API_BASE`: payment provider base URL (default: https://api.stripe.com)
/// - `STRIPE_WEBHOOK_TOLERANCE_SECS`: max webhook age (default: 300)
/// - `REPORT_PRICE_CENTS` / `REPORT_CURRENCY`: report price (default: 499 usd)
///
/// # Example
///
/// ```no_run
/// use codegrade_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use codegrade_evaluator::providers::{ProviderConfig, ProviderKind};
use codegrade_shared::billing::{signature::DEFAULT_TOLERANCE_SECS, stripe::DEFAULT_API_BASE};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token verification configuration
    pub auth: AuthConfig,

    /// LLM configuration
    pub llm: LlmConfig,

    /// Payment configuration
    pub billing: BillingConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (adds HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

/// Token verification configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret the identity provider signs access tokens with
    pub jwt_secret: String,
}

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Selected provider
    pub provider: ProviderKind,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini model
    pub gemini_model: String,

    /// OpenAI API key
    pub openai_api_key: String,

    /// OpenAI model
    pub openai_model: String,

    /// Endpoint override
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Substitute a canned report when the provider fails
    pub fallback_enabled: bool,
}

impl LlmConfig {
    /// Provider settings for the selected backend
    pub fn provider_config(&self) -> ProviderConfig {
        let (api_key, model) = match self.provider {
            ProviderKind::Gemini => (self.gemini_api_key.clone(), self.gemini_model.clone()),
            ProviderKind::OpenAi => (self.openai_api_key.clone(), self.openai_model.clone()),
            ProviderKind::Mock => (String::new(), "mock".to_string()),
        };

        ProviderConfig {
            kind: self.provider,
            api_key,
            model,
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Payment configuration
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Payment provider secret key
    pub stripe_secret_key: String,

    /// Webhook signing secret
    pub webhook_secret: String,

    /// Payment provider base URL
    pub api_base: String,

    /// Maximum accepted webhook age in seconds
    pub webhook_tolerance_secs: i64,

    /// Price of one full report, in cents
    pub report_price_cents: i64,

    /// Currency of the report price
    pub report_currency: String,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };
        let flag = |key: &str, default: bool| -> anyhow::Result<bool> {
            match lookup(key) {
                None => Ok(default),
                Some(v) => parse_bool(&v)
                    .ok_or_else(|| anyhow::anyhow!("{} must be true or false, got '{}'", key, v)),
            }
        };

        let api_port = var("API_PORT", "8080").parse::<u16>()?;
        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = required("DATABASE_URL")?;
        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10").parse::<u32>()?;

        let jwt_secret = required("AUTH_JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("AUTH_JWT_SECRET must be at least 32 characters long");
        }

        let provider_name = var("LLM_PROVIDER", "gemini");
        let provider = ProviderKind::from_str(&provider_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown LLM_PROVIDER '{}'", provider_name))?;

        let llm = LlmConfig {
            provider,
            gemini_api_key: var("GEMINI_API_KEY", ""),
            gemini_model: var("GEMINI_MODEL", "gemini-pro"),
            openai_api_key: var("OPENAI_API_KEY", ""),
            openai_model: var("OPENAI_MODEL", "gpt-3.5-turbo"),
            base_url: lookup("LLM_BASE_URL").filter(|v| !v.trim().is_empty()),
            timeout_secs: var("LLM_TIMEOUT_SECS", "60").parse::<u64>()?,
            fallback_enabled: flag("EVALUATION_FALLBACK", true)?,
        };

        let report_price_cents = var("REPORT_PRICE_CENTS", "499").parse::<i64>()?;
        if report_price_cents <= 0 {
            anyhow::bail!("REPORT_PRICE_CENTS must be positive");
        }

        let billing = BillingConfig {
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            api_base: var("STRIPE_API_BASE", DEFAULT_API_BASE),
            webhook_tolerance_secs: var(
                "STRIPE_WEBHOOK_TOLERANCE_SECS",
                &DEFAULT_TOLERANCE_SECS.to_string(),
            )
            .parse::<i64>()?,
            report_price_cents,
            report_currency: var("REPORT_CURRENCY", "usd").to_ascii_lowercase(),
        };

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port: api_port,
                cors_origins,
                production: flag("PRODUCTION", false)?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations: flag("RUN_MIGRATIONS", true)?,
            },
            auth: AuthConfig { jwt_secret },
            llm,
            billing,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
