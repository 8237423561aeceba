//! # CodeGrade Evaluator Library
//!
//! Turns a submitted task into an evaluation report by prompting an LLM and
//! validating its JSON answer, with tiered canned reports as a fallback.
//!
//! ## Modules
//!
//! - `providers`: LLM provider trait and vendor clients (Gemini, OpenAI, mock)
//! - `prompt`: reviewer prompt construction
//! - `parse`: extraction and validation of the model's JSON
//! - `fallback`: tiered canned reports
//! - `evaluator`: the pipeline tying them together
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use codegrade_evaluator::{EvaluationRequest, Evaluator, ReportTier};
//! use codegrade_evaluator::providers::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let evaluator = Evaluator::new(Arc::new(MockProvider::new()), true);
//!
//! let request = EvaluationRequest::new("FizzBuzz", "Print 1..100", Some("...".to_string()));
//! let outcome = evaluator.evaluate(&request, ReportTier::Free).await?;
//! println!("score: {}", outcome.report.score);
//! # Ok(())
//! # }
//! ```

pub mod evaluator;
pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod providers;

pub use evaluator::{EvaluationOutcome, Evaluator};
pub use fallback::ReportTier;
pub use parse::EvaluationReport;
pub use prompt::EvaluationRequest;
pub use providers::{EvaluatorError, EvaluatorResult};
