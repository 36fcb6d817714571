//! Frontend compilation pipeline
//!
//! Lexer, parser and binder for line scripts. A [`Compilation`] is the
//! compiled form of one line: its syntax tree plus the semantic model bound
//! against the predecessor chain.

use std::sync::Arc;

use tracing::debug;

pub mod lexer;
pub mod parser;
pub mod semantic;

use crate::util::diagnostic::{has_errors, Diagnostic};
use parser::{SourceKind, SyntaxTree};
use semantic::{BindContext, Globals, SemanticModel};

/// Compiled state of one line
#[derive(Debug)]
pub struct Compilation {
    pub tree: SyntaxTree,
    pub model: SemanticModel,
}

impl Compilation {
    /// Parse and bind `source`
    pub fn compile(
        source: &str,
        kind: SourceKind,
        ctx: BindContext<'_>,
    ) -> Self {
        debug!("Compiling {:?} source ({} bytes)", kind, source.len());
        let tree = parser::parse(source, kind);
        let model = semantic::bind(&tree, ctx);
        debug!(
            "Compiled with {} syntax and {} semantic diagnostics",
            tree.diagnostics.len(),
            model.diagnostics.len()
        );
        Self { tree, model }
    }

    /// Syntax diagnostics followed by semantic ones
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.tree.diagnostics.iter().chain(self.model.diagnostics.iter())
    }

    pub fn has_errors(&self) -> bool {
        has_errors(&self.tree.diagnostics) || has_errors(&self.model.diagnostics)
    }

    /// Scope this line exports to its successors
    pub fn globals(&self) -> &Arc<Globals> {
        &self.model.globals
    }
}
