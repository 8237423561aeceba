/// Extraction of an evaluation report from model output
///
/// Models are asked for bare JSON but routinely wrap it in markdown fences
/// or add a sentence before or after. The parser strips an enclosing fence, falls back
/// to the outermost `{ ... }` span, and then validates the shape field by
/// field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::providers::{EvaluatorError, EvaluatorResult};

/// A validated evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Score from 0 to 100
    pub score: i32,

    /// Strengths
    pub strengths: Vec<String>,

    /// Weaknesses
    pub weaknesses: Vec<String>,

    /// Improvements
    pub improvements: Vec<String>,

    /// Long-form report
    pub full_report: String,
}

/// Removes one enclosing markdown fence, leaving fences inside the body alone
fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn string_array(value: &Value, field: &str) -> EvaluatorResult<Vec<String>> {
    let items = value[field]
        .as_array()
        .ok_or_else(|| EvaluatorError::InvalidResponse(format!("`{}` must be an array", field)))?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                EvaluatorError::InvalidResponse(format!("`{}` must contain only strings", field))
            })
        })
        .collect()
}

fn validate(value: &Value) -> EvaluatorResult<EvaluationReport> {
    let score = value["score"]
        .as_f64()
        .ok_or_else(|| EvaluatorError::InvalidResponse("`score` must be a number".into()))?;

    if !(0.0..=100.0).contains(&score) {
        return Err(EvaluatorError::InvalidResponse(format!(
            "`score` {} is outside 0-100",
            score
        )));
    }

    let full_report = value["full_report"]
        .as_str()
        .ok_or_else(|| EvaluatorError::InvalidResponse("`full_report` must be a string".into()))?
        .to_string();

    Ok(EvaluationReport {
        score: score.round() as i32,
        strengths: string_array(value, "strengths")?,
        weaknesses: string_array(value, "weaknesses")?,
        improvements: string_array(value, "improvements")?,
        full_report,
    })
}

/// Parses and validates model output
///
/// # Errors
///
/// - `EmptyResponse` for blank text
/// - `InvalidResponse` when no JSON object is found or a field has the
///   wrong type or range
pub fn parse_report(text: &str) -> EvaluatorResult<EvaluationReport> {
    let cleaned = strip_fences(text);
    if cleaned.is_empty() {
        return Err(EvaluatorError::EmptyResponse);
    }

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(first_err) => {
            let object = outermost_object(cleaned).ok_or_else(|| {
                EvaluatorError::InvalidResponse(format!("no JSON object found: {}", first_err))
            })?;
            serde_json::from_str(object)
                .map_err(|e| EvaluatorError::InvalidResponse(format!("malformed JSON: {}", e)))?
        }
    };

    if !value.is_object() {
        return Err(EvaluatorError::InvalidResponse("expected a JSON object".into()));
    }

    validate(&value)
}
