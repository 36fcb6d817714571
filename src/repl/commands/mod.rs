//! Line command handlers
//!
//! Every submitted line is routed to exactly one [`CommandHandler`]. The
//! [`Dispatcher`] tries its handlers in a fixed priority order; the evaluate
//! handler accepts anything and therefore has to come last.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, trace};

use super::engine::{Evaluator, LineId, SubmissionStore};
use super::result::LineEvaluationResult;
use super::ReplError;
use crate::references::PackageInstaller;
use crate::runtime::EvaluationLogger;

mod evaluate;
mod exit;
mod package;
mod reference;

pub use evaluate::EvaluateHandler;
pub use exit::ExitHandler;
pub use package::PackageReferenceHandler;
pub use reference::AssemblyReferenceHandler;

/// A line consisting of a single `#r "<target>"` directive
static REFERENCE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*#r\s+"([^"]*)"\s*;?\s*$"#).expect("reference directive pattern is valid")
});

/// Target of a lone `#r` directive line
pub(crate) fn reference_target(code: &str) -> Option<&str> {
    REFERENCE_DIRECTIVE
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Handles one kind of line
pub trait CommandHandler: Send + Sync {
    /// Short name used in logs and tests
    fn name(&self) -> &'static str;

    fn can_handle(
        &self,
        code: &str,
    ) -> bool;

    fn handle(
        &self,
        line_id: LineId,
        code: &str,
        logger: &dyn EvaluationLogger,
    ) -> LineEvaluationResult;
}

/// Ordered handler list
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Vec<Arc<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Arc<dyn CommandHandler>>) -> Self {
        Self { handlers }
    }

    /// Exit, assembly reference, package reference, evaluate
    pub fn standard(
        store: Arc<SubmissionStore>,
        evaluator: Evaluator,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        Self::new(vec![
            Arc::new(ExitHandler),
            Arc::new(AssemblyReferenceHandler::new(Arc::clone(&store))),
            Arc::new(PackageReferenceHandler::new(Arc::clone(&store), installer)),
            Arc::new(EvaluateHandler::new(store, evaluator)),
        ])
    }

    /// First handler accepting `code`
    ///
    /// Failing to find one means the handler list has no catch-all, which
    /// is a setup defect rather than a user error.
    pub fn dispatch(
        &self,
        code: &str,
    ) -> Result<Arc<dyn CommandHandler>, ReplError> {
        match self.handlers.iter().find(|h| h.can_handle(code)) {
            Some(handler) => {
                trace!("Dispatching to {}", handler.name());
                Ok(Arc::clone(handler))
            }
            None => {
                error!("No handler accepts {:?}", code);
                Err(ReplError::NoHandler(code.to_string()))
            }
        }
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

#[cfg(test)]
mod tests;
