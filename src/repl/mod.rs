//! Line REPL engine
//!
//! [`ReplService`] is the entry point used by front ends. Each call names a
//! line by id; the submission store keeps one compiled unit per line, chained
//! to the previous line so declarations flow forward.

use thiserror::Error;

pub mod commands;
pub mod completion;
pub mod engine;
pub mod highlight;
pub mod line;
pub mod result;
pub mod service;

pub use commands::{CommandHandler, Dispatcher};
pub use completion::{CompletionItem, CompletionKind};
pub use engine::{LineId, SourceUnit, SubmissionStore};
pub use highlight::{ColorSpan, Highlighter};
pub use result::LineEvaluationResult;
pub use service::{ConfigurationLoaded, ReplService, ReplServiceBuilder, ServiceObserver};

/// Failures surfaced by the service
#[derive(Debug, Error)]
pub enum ReplError {
    /// The handler list has no catch-all; not recoverable
    #[error("no command handler accepts {0:?}")]
    NoHandler(String),

    /// Background construction failed; every operation reports it
    #[error("REPL initialization failed: {0}")]
    Initialization(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
