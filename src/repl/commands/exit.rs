//! Session exit

use super::CommandHandler;
use crate::repl::engine::LineId;
use crate::repl::result::LineEvaluationResult;
use crate::runtime::EvaluationLogger;

/// Ends the session on `exit`, `quit` or `#exit`
#[derive(Debug, Default, Clone, Copy)]
pub struct ExitHandler;

impl CommandHandler for ExitHandler {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn can_handle(
        &self,
        code: &str,
    ) -> bool {
        let word = code.trim();
        let word = word.strip_suffix(';').unwrap_or(word).trim_end();
        matches!(word, "exit" | "quit" | "#exit")
    }

    fn handle(
        &self,
        _line_id: LineId,
        _code: &str,
        _logger: &dyn EvaluationLogger,
    ) -> LineEvaluationResult {
        LineEvaluationResult::Exit
    }
}
