//! Parser module
//!
//! A recovering Pratt parser for line scripts. Every source text produces a
//! tree; problems are reported as diagnostics instead of failing the parse.

pub mod ast;
mod expr;
mod state;
mod stmt;

use serde::Serialize;

pub use state::{ParserState, BP_LOWEST, MAX_NESTING_DEPTH};

use crate::frontend::lexer::tokens::{Token, TokenKind};
use crate::frontend::lexer::{tokenize, Lexed};
use crate::util::diagnostic::{Diagnostic, DiagnosticCode};
use ast::*;
use stmt::StmtContext;

/// How a document's text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    /// Top-level statements, `using`/`#r` directives and a trailing result expression
    Script,
    /// Namespaces, classes and methods only
    Regular,
}

impl SourceKind {
    #[inline]
    pub fn is_script(self) -> bool {
        self == SourceKind::Script
    }
}

/// Result of parsing one document
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub kind: SourceKind,
    pub items: Vec<Item>,
    /// Every token including comments, `Eof`-terminated
    pub tokens: Vec<Token>,
    /// Lexer and parser diagnostics, in source order of discovery
    pub diagnostics: Vec<Diagnostic>,
}

impl SyntaxTree {
    /// Top-level statements (script documents)
    pub fn statements(&self) -> impl Iterator<Item = &Stmt> {
        self.items.iter().filter_map(|item| match item {
            Item::Stmt(stmt) => Some(stmt),
            Item::Namespace(_) => None,
        })
    }

    /// The trailing result expression, if the script ends with one
    pub fn result_expr(&self) -> Option<&Expr> {
        match self.statements().last()?.kind {
            StmtKind::Result(ref expr) => Some(expr),
            _ => None,
        }
    }
}

/// Parse source text
///
/// # Example
/// ```
/// use replchain::frontend::parser::{parse, SourceKind};
///
/// let tree = parse("var x = 1; x + 1", SourceKind::Script);
/// assert!(tree.diagnostics.is_empty());
/// assert!(tree.result_expr().is_some());
/// ```
pub fn parse(
    source: &str,
    kind: SourceKind,
) -> SyntaxTree {
    let lexed = tokenize(source);
    let significant = lexed.significant();
    let Lexed {
        tokens,
        mut diagnostics,
    } = lexed;

    let mut state = ParserState::new(significant);
    let items = match kind {
        SourceKind::Script => parse_script(&mut state),
        SourceKind::Regular => parse_regular(&mut state),
    };
    diagnostics.extend(state.into_diagnostics());

    SyntaxTree {
        kind,
        items,
        tokens,
        diagnostics,
    }
}

/// Parse a standalone expression from already-lexed tokens
pub fn parse_expression_tokens(tokens: Vec<Token>) -> Option<Expr> {
    let mut state = ParserState::new(terminate(tokens));
    let expr = state.parse_expression(BP_LOWEST)?;
    (state.at_end() && state.diagnostic_count() == 0).then_some(expr)
}

fn terminate(mut tokens: Vec<Token>) -> Vec<Token> {
    tokens.retain(|t| !t.kind.is_trivia());
    if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        tokens.push(Token::new(
            TokenKind::Eof,
            crate::util::span::Span::new(end, end),
        ));
    }
    tokens
}

fn parse_script(state: &mut ParserState) -> Vec<Item> {
    let mut items = Vec::new();
    while !state.at_end() {
        if let Some(stmt) = state.parse_stmt_recovering(StmtContext::ScriptTop) {
            items.push(Item::Stmt(stmt));
        }
    }
    items
}

fn parse_regular(state: &mut ParserState) -> Vec<Item> {
    let mut items = Vec::new();
    while !state.at_end() {
        match state.kind() {
            TokenKind::KwUsing => {
                if let Some(using) = state.parse_using() {
                    items.push(Item::Stmt(using));
                }
            }
            TokenKind::KwNamespace => {
                let before = state.token_index();
                match state.parse_namespace() {
                    Some(ns) => items.push(Item::Namespace(ns)),
                    None if state.token_index() == before => state.bump(),
                    None => state.synchronize(),
                }
            }
            _ => {
                state.error(
                    DiagnosticCode::StatementNotAllowed,
                    "statements are not allowed outside a method",
                    state.span(),
                );
                state.parse_stmt_recovering(StmtContext::Block);
            }
        }
    }
    items
}

#[cfg(test)]
mod tests;
