//! replchain: an incremental line REPL engine
//!
//! Each REPL line is compiled as its own project, chained to the previous
//! line so its declarations are visible further down. Lines can be edited
//! in any order; completion, highlighting and evaluation always see the
//! current text of every predecessor.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use replchain::repl::{LineId, ReplService};
//! use replchain::runtime::ConsoleLogger;
//! use replchain::util::config::UserConfiguration;
//!
//! # async fn demo() -> Result<(), replchain::repl::ReplError> {
//! let service = ReplService::start(UserConfiguration::default());
//! service.evaluate(LineId(1), "int x = 20;", Arc::new(ConsoleLogger)).await?;
//! let result = service.evaluate(LineId(2), "x * 2 + 2", Arc::new(ConsoleLogger)).await?;
//! println!("{:?}", result.value());
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]

use std::sync::Arc;

use tracing::debug;

pub mod frontend;
pub mod references;
pub mod repl;
pub mod runtime;
pub mod workspace;

// Utility modules
pub mod util;

use crate::repl::{LineEvaluationResult, LineId, ReplError, ReplService};
use crate::runtime::EvaluationLogger;
use crate::util::config::UserConfiguration;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name
pub const NAME: &str = "replchain";

/// Evaluate `lines` as lines 1, 2, ... of a fresh session
///
/// Stops after a line that ends the session.
pub async fn evaluate_lines<S: AsRef<str>>(
    config: UserConfiguration,
    lines: &[S],
    logger: Arc<dyn EvaluationLogger>,
) -> Result<Vec<(LineId, LineEvaluationResult)>, ReplError> {
    let service = ReplService::start(config);
    let mut results = Vec::with_capacity(lines.len());
    for (i, code) in lines.iter().enumerate() {
        let line_id = LineId(i as u64 + 1);
        let result = service
            .evaluate(line_id, code.as_ref(), Arc::clone(&logger))
            .await?;
        debug!("Line {}: {:?}", line_id, result);
        let exit = result.is_exit();
        results.push((line_id, result));
        if exit {
            break;
        }
    }
    Ok(results)
}
