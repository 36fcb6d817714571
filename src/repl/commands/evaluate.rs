//! Catch-all evaluation

use std::sync::Arc;

use super::CommandHandler;
use crate::repl::engine::{Evaluator, LineId, SubmissionStore};
use crate::repl::result::LineEvaluationResult;
use crate::runtime::EvaluationLogger;

/// Compiles and runs the line; accepts every input
pub struct EvaluateHandler {
    store: Arc<SubmissionStore>,
    evaluator: Evaluator,
}

impl EvaluateHandler {
    pub fn new(
        store: Arc<SubmissionStore>,
        evaluator: Evaluator,
    ) -> Self {
        Self { store, evaluator }
    }
}

impl CommandHandler for EvaluateHandler {
    fn name(&self) -> &'static str {
        "evaluate"
    }

    fn can_handle(
        &self,
        _code: &str,
    ) -> bool {
        true
    }

    fn handle(
        &self,
        line_id: LineId,
        code: &str,
        logger: &dyn EvaluationLogger,
    ) -> LineEvaluationResult {
        let unit = match self.store.get(line_id) {
            Some(unit) if unit.code() == code => unit,
            _ => self.store.create_or_update(line_id, code, &[]),
        };
        self.evaluator.evaluate(&unit, logger)
    }
}
