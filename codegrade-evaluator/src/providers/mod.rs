/// LLM providers
///
/// This module defines the provider trait and the HTTP clients for each
/// supported vendor.
///
/// # Provider Types
///
/// - **Gemini**: Google `generateContent` REST API
/// - **OpenAI**: chat completions REST API
/// - **Mock**: scripted responses for tests and offline development
///
/// # Example
///
/// ```no_run
/// use codegrade_evaluator::providers::{build_provider, ProviderConfig, ProviderKind};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = build_provider(&ProviderConfig {
///     kind: ProviderKind::Gemini,
///     api_key: "key".to_string(),
///     model: "gemini-pro".to_string(),
///     base_url: None,
///     timeout_secs: 60,
/// })?;
///
/// let text = provider.generate("Say hello as JSON").await?;
/// # Ok(())
/// # }
/// ```

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod provider_trait;

use std::sync::Arc;
use std::time::Duration;

// Re-export main types
pub use gemini::GeminiProvider;
pub use mock::{MockProvider, MockResponse};
pub use openai::OpenAiProvider;
pub use provider_trait::{EvaluatorError, EvaluatorResult, LlmProvider, ProviderKind};

/// Settings for constructing a provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which backend to use
    pub kind: ProviderKind,

    /// Vendor API key
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Override for the vendor's base URL
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Builds the configured provider
///
/// # Errors
///
/// Returns `NotConfigured` when a remote provider has no API key.
pub fn build_provider(config: &ProviderConfig) -> EvaluatorResult<Arc<dyn LlmProvider>> {
    if config.kind != ProviderKind::Mock && config.api_key.trim().is_empty() {
        return Err(EvaluatorError::NotConfigured(format!(
            "missing API key for {}",
            config.kind
        )));
    }

    let http = http_client(config.timeout_secs)?;

    let provider: Arc<dyn LlmProvider> = match config.kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            http,
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            http,
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )),
        ProviderKind::Mock => Arc::new(MockProvider::new()),
    };

    Ok(provider)
}

fn http_client(timeout_secs: u64) -> EvaluatorResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| EvaluatorError::NotConfigured(format!("HTTP client: {}", e)))
}

/// Reads a JSON body, turning non-2xx statuses into `EvaluatorError::Provider`
pub(crate) async fn read_json(response: reqwest::Response) -> EvaluatorResult<serde_json::Value> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        return Err(EvaluatorError::Provider {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| EvaluatorError::Request(format!("invalid JSON from provider: {}", e)))
}
