//! `#r "<library>"`

use std::sync::Arc;

use tracing::debug;

use super::{reference_target, CommandHandler};
use crate::references::{PackageSpec, CATALOG};
use crate::repl::engine::{LineId, SubmissionStore};
use crate::repl::result::LineEvaluationResult;
use crate::runtime::EvaluationLogger;

/// Adds a catalog library to the line's references
pub struct AssemblyReferenceHandler {
    store: Arc<SubmissionStore>,
}

impl AssemblyReferenceHandler {
    pub fn new(store: Arc<SubmissionStore>) -> Self {
        Self { store }
    }
}

impl CommandHandler for AssemblyReferenceHandler {
    fn name(&self) -> &'static str {
        "assembly-reference"
    }

    fn can_handle(
        &self,
        code: &str,
    ) -> bool {
        reference_target(code).is_some_and(|target| !PackageSpec::is_package_target(target))
    }

    fn handle(
        &self,
        line_id: LineId,
        code: &str,
        logger: &dyn EvaluationLogger,
    ) -> LineEvaluationResult {
        let Some(target) = reference_target(code) else {
            return LineEvaluationResult::runtime_error("expected #r \"<library>\"");
        };
        let references = match CATALOG.resolve_target(target) {
            Ok(references) => references,
            Err(e) => {
                logger.write_error(&format!("{}\n", e));
                return LineEvaluationResult::runtime_error(e.to_string());
            }
        };

        self.store.create_or_update(line_id, code, &references);
        debug!("Line {} referenced {}", line_id, target);
        logger.write_output(&format!("Referenced {}\n", target.trim()));
        LineEvaluationResult::success(None)
    }
}
