/// Google Gemini provider
///
/// Calls `POST {base}/v1beta/models/{model}:generateContent` with the API
/// key in the `x-goog-api-key` header and concatenates the text parts of the
/// first candidate.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{read_json, EvaluatorError, EvaluatorResult, LlmProvider};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const TEMPERATURE: f64 = 0.7;
const TOP_K: u32 = 1;
const TOP_P: f64 = 1.0;
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Gemini `generateContent` client
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
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

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "topK": TOP_K,
                "topP": TOP_P,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            }
        })
    }
}

/// Joins the text parts of the first candidate
fn extract_text(body: &Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> EvaluatorResult<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending Gemini request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        let body = read_json(response).await?;
        extract_text(&body).ok_or(EvaluatorError::EmptyResponse)
    }
}
