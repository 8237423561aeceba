/// Core LLM provider trait and types
///
/// A provider turns a prompt into free text. Everything else (prompt
/// construction, JSON extraction, fallbacks) lives above this seam, so a
/// provider only has to speak its vendor's HTTP API.
///
/// # Provider Contract
///
/// All providers must:
/// 1. Implement the `LlmProvider` trait (async)
/// 2. Return the model's raw text, untouched
/// 3. Map transport and vendor failures onto [`EvaluatorError`]
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use codegrade_evaluator::providers::{EvaluatorResult, LlmProvider};
///
/// struct Echo;
///
/// #[async_trait]
/// impl LlmProvider for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn model(&self) -> &str {
///         "echo-1"
///     }
///
///     async fn generate(&self, prompt: &str) -> EvaluatorResult<String> {
///         Ok(prompt.to_string())
///     }
/// }
/// ```

use async_trait::async_trait;
use std::fmt;

/// Evaluator error types
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    /// Request never got a usable response (connect, timeout, body read)
    #[error("LLM request failed: {0}")]
    Request(String),

    /// Provider answered with an error status
    #[error("LLM provider returned {status}: {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Provider error message
        message: String,
    },

    /// Provider answered without any text
    #[error("LLM returned no content")]
    EmptyResponse,

    /// Text did not contain a valid evaluation
    #[error("Invalid evaluation response: {0}")]
    InvalidResponse(String),

    /// Provider missing or misconfigured
    #[error("LLM provider not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for EvaluatorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EvaluatorError::Request(format!("timed out: {}", err))
        } else {
            EvaluatorError::Request(err.to_string())
        }
    }
}

/// Evaluator result type alias
pub type EvaluatorResult<T> = Result<T, EvaluatorError>;

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Gemini `generateContent`
    Gemini,

    /// OpenAI chat completions
    OpenAi,

    /// Scripted in-process provider
    Mock,
}

impl ProviderKind {
    /// Parses a provider name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            "mock" => Some(ProviderKind::Mock),
            _ => None,
        }
    }

    /// Canonical provider name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core LLM provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name, used for logging
    fn name(&self) -> &str;

    /// Returns the model identifier requests are sent to
    fn model(&self) -> &str;

    /// Sends `prompt` and returns the generated text
    ///
    /// # Errors
    ///
    /// - `Request` for transport failures and timeouts
    /// - `Provider` for non-2xx responses
    /// - `EmptyResponse` when the response carries no text
    async fn generate(&self, prompt: &str) -> EvaluatorResult<String>;
}
