//! Completion on a synthesized document
//!
//! Line code is statement-level script code, which is not a valid regular
//! document on its own. The synthesizer embeds it in a method body, compiles
//! that document in a private fork of the line's snapshot, and maps the caret
//! into it. The fork is never applied to the workspace.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use super::engine::CompletionEngine;
use super::CompletionItem;
use crate::frontend::lexer::is_identifier_char;
use crate::repl::engine::{ChainBuilder, SourceUnit};
use crate::workspace::Workspace;

/// Text placed before the line's code
pub const WRAPPER_PREFIX: &str =
    "namespace Submission\n{\n    class Program\n    {\n        void Main()\n        {\n";

/// Text placed after the line's code
pub const WRAPPER_SUFFIX: &str = "\n        }\n    }\n}\n";

/// Completion for line units
pub struct CompletionSynthesizer {
    workspace: Arc<Workspace>,
    chain: ChainBuilder,
    engine: CompletionEngine,
}

impl CompletionSynthesizer {
    pub fn new(
        workspace: Arc<Workspace>,
        chain: ChainBuilder,
    ) -> Self {
        Self {
            workspace,
            chain,
            engine: CompletionEngine::new(),
        }
    }

    /// Candidates for `unit` at byte offset `caret` of its code, filtered by
    /// the identifier fragment typed before the caret
    pub fn complete(
        &self,
        unit: &SourceUnit,
        caret: usize,
    ) -> Vec<CompletionItem> {
        let code = unit.code();
        if caret > code.len() || !code.is_char_boundary(caret) {
            return Vec::new();
        }

        let text = synthesize(code);
        let absolute = WRAPPER_PREFIX.len() + caret;

        let handle = unit.handle();
        let Some(line_project) = handle.project() else {
            return Vec::new();
        };
        let id = self.workspace.new_project_id();
        let project = self.chain.synthetic_project(
            id,
            text,
            handle.project_reference(),
            line_project.references().iter().cloned(),
        );
        let fork = handle.solution().with_project(project);
        let Some(compilation) = fork.compilation(id) else {
            return Vec::new();
        };

        let raw = self.engine.candidates(&compilation, absolute);
        let fragment = typed_fragment(code, caret);
        trace!(
            "Completion at {} of line {}: {} raw candidates, fragment {:?}",
            caret,
            unit.line_id(),
            raw.len(),
            fragment
        );
        filter_candidates(raw, fragment)
    }
}

/// Wrap line code into a regular document
pub fn synthesize(code: &str) -> String {
    let mut text = String::with_capacity(WRAPPER_PREFIX.len() + code.len() + WRAPPER_SUFFIX.len());
    text.push_str(WRAPPER_PREFIX);
    text.push_str(code);
    text.push_str(WRAPPER_SUFFIX);
    text
}

/// Identifier characters directly before `caret`
pub fn typed_fragment(
    code: &str,
    caret: usize,
) -> &str {
    let head = &code[..caret];
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_identifier_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(caret);
    &head[start..]
}

/// Keep candidates whose label starts with `fragment` (ignoring case), first
/// occurrence of each label only, in engine order
pub fn filter_candidates(
    candidates: Vec<CompletionItem>,
    fragment: &str,
) -> Vec<CompletionItem> {
    let wanted = fragment.to_lowercase();
    let mut unique: IndexMap<String, CompletionItem> = IndexMap::new();
    for item in candidates {
        if item.label.to_lowercase().starts_with(&wanted) {
            unique.entry(item.label.clone()).or_insert(item);
        }
    }
    unique.into_values().collect()
}
