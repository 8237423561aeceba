/// Evaluation pipeline
///
/// ```text
/// EvaluationRequest ─> build_prompt ─> LlmProvider::generate ─> parse_report
///                                              │ error            │ error
///                                              └──────┬───────────┘
///                                                     v
///                                     fallback_report (when enabled)
/// ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::fallback::{fallback_report, ReportTier};
use crate::parse::{parse_report, EvaluationReport};
use crate::prompt::{build_prompt, EvaluationRequest};
use crate::providers::{EvaluatorResult, LlmProvider};

/// Result of one evaluation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// The report to store
    pub report: EvaluationReport,

    /// True when the report is canned rather than model-generated
    pub fallback: bool,
}

/// Runs evaluations against one provider
#[derive(Clone)]
pub struct Evaluator {
    provider: Arc<dyn LlmProvider>,
    fallback_enabled: bool,
}

impl Evaluator {
    /// Creates an evaluator
    ///
    /// With `fallback_enabled`, provider and parse failures yield a canned
    /// report instead of an error.
    pub fn new(provider: Arc<dyn LlmProvider>, fallback_enabled: bool) -> Self {
        Self {
            provider,
            fallback_enabled,
        }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Whether failures fall back to canned reports
    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    async fn generate_report(&self, request: &EvaluationRequest) -> EvaluatorResult<EvaluationReport> {
        let prompt = build_prompt(request);
        let text = self.provider.generate(&prompt).await?;
        debug!(provider = self.provider.name(), response_len = text.len(), "LLM response received");
        parse_report(&text)
    }

    /// Evaluates a submission
    ///
    /// # Errors
    ///
    /// Returns the provider or parse error when fallback is disabled.
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
        tier: ReportTier,
    ) -> EvaluatorResult<EvaluationOutcome> {
        match self.generate_report(request).await {
            Ok(report) => {
                info!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    score = report.score,
                    "Evaluation generated"
                );
                Ok(EvaluationOutcome {
                    report,
                    fallback: false,
                })
            }
            Err(e) if self.fallback_enabled => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    ?tier,
                    "LLM evaluation failed, using fallback report"
                );
                let report = fallback_report(request, tier, &mut rand::thread_rng());
                Ok(EvaluationOutcome {
                    report,
                    fallback: true,
                })
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "LLM evaluation failed");
                Err(e)
            }
        }
    }
}
