//! Outcome of evaluating one line

use serde::Serialize;

use crate::runtime::Value;
use crate::util::diagnostic::Diagnostic;

/// Result returned by a command handler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineEvaluationResult {
    /// The line ran; `value` is its trailing expression's value
    Success { value: Option<Value> },
    /// The line did not compile
    CompileError { diagnostics: Vec<Diagnostic> },
    /// The line compiled but failed while running, or a handler could not do its job
    RuntimeError { message: String },
    /// The session should end
    Exit,
}

impl LineEvaluationResult {
    pub fn success(value: Option<Value>) -> Self {
        LineEvaluationResult::Success { value }
    }

    pub fn runtime_error(message: impl Into<String>) -> Self {
        LineEvaluationResult::RuntimeError {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LineEvaluationResult::Success { .. })
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, LineEvaluationResult::Exit)
    }

    /// Value of a successful evaluation
    pub fn value(&self) -> Option<&Value> {
        match self {
            LineEvaluationResult::Success { value } => value.as_ref(),
            _ => None,
        }
    }

    /// Human-readable lines, diagnostics positioned against `source`
    pub fn render(
        &self,
        source: &str,
    ) -> Vec<String> {
        match self {
            LineEvaluationResult::Success { value: Some(value) } => vec![value.display_result()],
            LineEvaluationResult::Success { value: None } | LineEvaluationResult::Exit => Vec::new(),
            LineEvaluationResult::CompileError { diagnostics } => {
                diagnostics.iter().map(|d| d.render(source)).collect()
            }
            LineEvaluationResult::RuntimeError { message } => vec![message.clone()],
        }
    }
}
