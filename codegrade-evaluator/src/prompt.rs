/// Evaluation prompt construction

use serde::{Deserialize, Serialize};

/// What gets evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Submitted code, if any
    pub code: Option<String>,
}

impl EvaluationRequest {
    /// Creates a request
    pub fn new(title: impl Into<String>, description: impl Into<String>, code: Option<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            code,
        }
    }

    /// Submitted code; blank code counts as none
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.trim().is_empty())
    }
}

const CODE_CRITERIA: &[&str] = &[
    "Code correctness and functionality",
    "Code quality and readability",
    "Best practices and conventions",
    "Performance considerations",
    "Security aspects",
    "Error handling",
    "Documentation and comments",
    "Maintainability and scalability",
    "Algorithm efficiency",
    "Design patterns usage",
];

const TASK_CRITERIA: &[&str] = &[
    "Task clarity and requirements analysis",
    "Suggested approach and architecture",
    "Best practices for implementation",
    "Potential challenges and solutions",
    "Technology stack recommendations",
    "Learning resources and next steps",
];

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the reviewer prompt for a request
///
/// The prompt asks for a single JSON object with `score`, `strengths`,
/// `weaknesses`, `improvements` and `full_report`.
pub fn build_prompt(request: &EvaluationRequest) -> String {
    let submission = match request.code() {
        Some(code) => format!("Code:\n```\n{}\n```", code),
        None => "No code provided - evaluate the task description and provide guidance.".to_string(),
    };

    format!(
        r#"You are an expert code reviewer and software engineering mentor. Evaluate the following coding task:

Title: {title}
Description: {description}
{submission}

Analyze the specific code or task thoroughly and give personalized feedback rather than generic advice.

Respond with a single JSON object in exactly this format:
{{
  "score": <number between 0-100 based on actual analysis>,
  "strengths": [<3-5 specific strengths of this submission>],
  "weaknesses": [<3-5 specific weaknesses or areas needing improvement>],
  "improvements": [<4-6 actionable improvement suggestions tailored to this submission>],
  "full_report": "<detailed 300-500 word analysis covering code quality, architecture, performance, security, best practices, specific recommendations and a learning path>"
}}

Evaluation criteria:
{code_criteria}

If no code is provided, focus on:
{task_criteria}

Provide constructive, actionable and specific feedback that helps the developer improve."#,
        title = request.title,
        description = request.description,
        submission = submission,
        code_criteria = bullet_list(CODE_CRITERIA),
        task_criteria = bullet_list(TASK_CRITERIA),
    )
}
