//! REPL Evaluation Engine
//!
//! Submission store, dependency chain construction and line evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod chain;
pub mod evaluator;
pub mod shard;
pub mod store;

pub use chain::ChainBuilder;
pub use evaluator::Evaluator;
pub use shard::ShardedMap;
pub use store::{SourceUnit, SubmissionStore};

/// UI-assigned identifier of one editable line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl LineId {
    /// The identifier one below this one; line ids start at 1
    pub fn predecessor(self) -> Option<LineId> {
        self.0.checked_sub(1).filter(|&n| n > 0).map(LineId)
    }
}

impl fmt::Display for LineId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LineId {
    fn from(id: u64) -> Self {
        LineId(id)
    }
}

#[cfg(test)]
mod tests;
