//! Semantic analysis
//!
//! Binds a parsed line against the globals exported by its predecessor chain
//! and the library types its references bring in. The resulting
//! [`SemanticModel`] carries the line's own exported scope, diagnostics, and
//! the symbol information completion and highlighting need.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::frontend::parser::ast::Expr;
use crate::frontend::parser::SyntaxTree;
use crate::references::{LibraryType, Reference};
use crate::util::diagnostic::Diagnostic;
use crate::util::span::Span;

mod binder;
mod scope;
pub mod types;

pub use scope::{Globals, Import, Imports};
pub use types::Type;

/// What an expression denotes
#[derive(Debug, Clone, Copy)]
pub enum Bound {
    Value(Type),
    Type(&'static LibraryType),
    Namespace(&'static str),
    Error,
}

/// Classification of a name occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolClass {
    Namespace,
    Type,
    Method,
    Property,
    Field,
    Variable,
}

/// A block-scoped variable
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSymbol {
    pub name: String,
    pub ty: Type,
    /// Offset after which the variable is in scope
    pub declared_at: usize,
    /// Enclosing block
    pub scope: Span,
}

impl LocalSymbol {
    pub fn is_visible_at(
        &self,
        offset: usize,
    ) -> bool {
        self.declared_at <= offset && self.scope.start < offset && offset < self.scope.end
    }
}

/// Inputs the binder takes from the line's project
pub struct BindContext<'a> {
    /// Exported scope of the predecessor line
    pub parent: Option<Arc<Globals>>,
    /// References accumulated on this line
    pub references: &'a IndexSet<Reference>,
    /// Implicit usings from the Default Reference Set
    pub implicit_usings: &'a [String],
}

/// Semantic facts about one compiled line
#[derive(Debug)]
pub struct SemanticModel {
    /// This line's exported scope; its parent is the predecessor's
    pub globals: Arc<Globals>,
    pub imports: Arc<Imports>,
    pub diagnostics: Vec<Diagnostic>,
    pub locals: Vec<LocalSymbol>,
    /// Name occurrences in source order
    pub symbols: Vec<(Span, SymbolClass)>,
    /// Type of the trailing result expression
    pub result_type: Option<Type>,
}

impl SemanticModel {
    /// Block locals in scope at `offset`, innermost declaration first
    pub fn locals_at(
        &self,
        offset: usize,
    ) -> IndexMap<&str, Type> {
        let mut visible = IndexMap::new();
        for local in self.locals.iter().rev() {
            if local.is_visible_at(offset) {
                visible.entry(local.name.as_str()).or_insert(local.ty);
            }
        }
        visible
    }

    /// Bind an expression as if it appeared at `offset`, without reporting
    /// diagnostics
    pub fn bind_at(
        &self,
        expr: &Expr,
        offset: usize,
    ) -> Bound {
        let locals = self
            .locals_at(offset)
            .into_iter()
            .map(|(name, ty)| (name.to_string(), ty))
            .collect();
        binder::Binder::for_query(&self.globals, &self.imports, locals).bind_expr(expr)
    }
}

/// Bind a parsed line
pub fn bind(
    tree: &SyntaxTree,
    ctx: BindContext<'_>,
) -> SemanticModel {
    binder::bind_tree(tree, ctx)
}
