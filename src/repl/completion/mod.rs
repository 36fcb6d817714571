//! Code completion
//!
//! [`CompletionSynthesizer`] embeds a line in a throwaway regular document
//! and asks [`CompletionEngine`] for the candidates at the caret.

use serde::Serialize;

pub mod engine;
pub mod synthesizer;

pub use engine::CompletionEngine;
pub use synthesizer::CompletionSynthesizer;

/// What a completion candidate refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Keyword,
    Namespace,
    Type,
    Method,
    Property,
    Field,
    Variable,
}

/// A single suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    /// Signature or type, when there is one to show
    pub detail: Option<String>,
}

impl CompletionItem {
    pub fn new(
        label: impl Into<String>,
        kind: CompletionKind,
        detail: Option<String>,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            detail,
        }
    }
}

#[cfg(test)]
mod tests;
