/// OpenAI chat completions provider
///
/// Calls `POST {base}/v1/chat/completions` with a fixed reviewer system
/// message and returns the first choice's content.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{read_json, EvaluatorError, EvaluatorResult, LlmProvider};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// System message sent with every request
pub const SYSTEM_MESSAGE: &str =
    "You are an expert code reviewer. Always respond with valid JSON only.";

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 2000;

/// Chat completions client
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Creates a provider; `base_url` defaults to [`DEFAULT_BASE_URL`]
    pub fn new(http: reqwest::Client, api_key: String, model: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_MESSAGE },
                { "role": "user", "content": prompt }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        })
    }
}

fn extract_content(body: &Value) -> Option<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> EvaluatorResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending OpenAI request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let body = read_json(response).await?;
        extract_content(&body).ok_or(EvaluatorError::EmptyResponse)
    }
}
