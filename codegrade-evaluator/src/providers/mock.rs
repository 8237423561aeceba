/// Mock provider for testing and offline development
///
/// Replays a script of responses in order. Once the script is exhausted it
/// answers every prompt with a fixed, valid evaluation, so `LLM_PROVIDER=mock`
/// gives a working server without any API key.
///
/// # Example
///
/// ```
/// use codegrade_evaluator::providers::{LlmProvider, MockProvider, MockResponse};
///
/// # async fn example() {
/// let provider = MockProvider::with_script(vec![
///     MockResponse::Fail("upstream unavailable".to_string()),
///     MockResponse::Text("{\"score\": 88}".to_string()),
/// ]);
///
/// assert!(provider.generate("first").await.is_err());
/// assert_eq!(provider.generate("second").await.unwrap(), "{\"score\": 88}");
/// assert_eq!(provider.prompts().len(), 2);
/// # }
/// ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{EvaluatorError, EvaluatorResult, LlmProvider};

/// Response served once the script runs out
pub const DEFAULT_RESPONSE: &str = r#"{
  "score": 78,
  "strengths": ["Readable structure", "Sensible naming"],
  "weaknesses": ["Little input validation"],
  "improvements": ["Validate inputs at the boundary", "Add unit tests"],
  "full_report": "The submission solves the task with a readable structure. Input validation and tests are the main gaps."
}"#;

/// One scripted reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Return this text
    Text(String),

    /// Fail with `EvaluatorError::Request`
    Fail(String),
}

/// Scripted provider
#[derive(Debug, Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Creates a provider that always returns [`DEFAULT_RESPONSE`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider replaying `script` first
    pub fn with_script(script: Vec<MockResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> EvaluatorResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Fail(message)) => Err(EvaluatorError::Request(message)),
            None => Ok(DEFAULT_RESPONSE.to_string()),
        }
    }
}
