//! Line evaluation
//!
//! A line is run on a fresh interpreter after replaying its predecessors, so
//! the values it sees always come from the predecessors' current text.

use tracing::{debug, trace};

use super::store::SourceUnit;
use crate::repl::result::LineEvaluationResult;
use crate::runtime::{EvaluationLogger, Interpreter, NullLogger};
use crate::runtime::interpreter::DEFAULT_MAX_STEPS;
use crate::util::diagnostic::Diagnostic;

/// Evaluates compiled units
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    max_steps: u64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}

impl Evaluator {
    /// Evaluator with a step budget per executed line
    pub fn new(max_steps: u64) -> Self {
        Self { max_steps }
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Evaluate `unit`, writing its output to `logger`
    pub fn evaluate(
        &self,
        unit: &SourceUnit,
        logger: &dyn EvaluationLogger,
    ) -> LineEvaluationResult {
        let handle = unit.handle();
        let Some(compilation) = handle.compilation() else {
            return LineEvaluationResult::runtime_error(format!(
                "line {} is not part of the workspace",
                unit.line_id()
            ));
        };
        if compilation.has_errors() {
            let diagnostics: Vec<Diagnostic> = compilation.diagnostics().cloned().collect();
            debug!(
                "Line {} has {} compile diagnostics",
                unit.line_id(),
                diagnostics.len()
            );
            return LineEvaluationResult::CompileError { diagnostics };
        }

        let mut interpreter = Interpreter::new(self.max_steps);
        for predecessor in handle.predecessors() {
            let Some(previous) = predecessor.compilation() else {
                continue;
            };
            if previous.has_errors() {
                trace!("Skipping project {} during replay: compile errors", predecessor.id());
                continue;
            }
            if let Err(e) = interpreter.execute(&previous.tree, &previous.model, &NullLogger) {
                trace!("Replay of project {} stopped: {}", predecessor.id(), e);
            }
        }

        match interpreter.execute(&compilation.tree, &compilation.model, logger) {
            Ok(value) => LineEvaluationResult::success(value),
            Err(e) => {
                debug!("Line {} failed: {}", unit.line_id(), e);
                LineEvaluationResult::runtime_error(e.to_string())
            }
        }
    }
}
