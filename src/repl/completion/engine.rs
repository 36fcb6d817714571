//! Completion candidates for a compiled document

use crate::frontend::lexer::tokens::{Token, TokenKind, KEYWORDS};
use crate::frontend::parser::parse_expression_tokens;
use crate::frontend::semantic::{Bound, Import};
use crate::frontend::Compilation;
use crate::references::{instance_members, Member, MemberKind};

use super::{CompletionItem, CompletionKind};

/// Produces every candidate valid at a position, unfiltered
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionEngine;

impl CompletionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Candidates at byte offset `caret` of the compiled document; empty when
    /// the position is not completable
    pub fn candidates(
        &self,
        compilation: &Compilation,
        caret: usize,
    ) -> Vec<CompletionItem> {
        let tokens = &compilation.tree.tokens;
        if inside_literal_or_comment(tokens, caret) {
            return Vec::new();
        }

        // significant tokens that end at or before the caret
        let mut before: Vec<&Token> = tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof && t.span.end <= caret)
            .collect();

        // drop the fragment being typed
        if let Some(last) = before.last() {
            if last.span.end == caret && is_word(&last.kind) {
                before.pop();
            }
        }

        match before.last().map(|t| &t.kind) {
            Some(TokenKind::Dot) => self.member_candidates(compilation, &before, caret),
            Some(TokenKind::KwVar) => Vec::new(),
            Some(kind) if kind.is_type_keyword() => Vec::new(),
            _ => self.scope_candidates(compilation, caret),
        }
    }

    fn member_candidates(
        &self,
        compilation: &Compilation,
        before: &[&Token],
        caret: usize,
    ) -> Vec<CompletionItem> {
        let dot = before.len() - 1;
        let start = receiver_start(before, dot);
        if start == dot {
            return Vec::new();
        }
        let receiver: Vec<Token> = before[start..dot].iter().map(|t| (*t).clone()).collect();
        let Some(expr) = parse_expression_tokens(receiver) else {
            return Vec::new();
        };

        let model = &compilation.model;
        match model.bind_at(&expr, caret) {
            Bound::Value(ty) => instance_members(ty).iter().map(member_item).collect(),
            Bound::Type(t) => t.members.iter().map(member_item).collect(),
            Bound::Namespace(ns) => model
                .imports
                .namespace_members(ns)
                .into_iter()
                .map(|import| import_item(import, Some(ns)))
                .collect(),
            Bound::Error => Vec::new(),
        }
    }

    fn scope_candidates(
        &self,
        compilation: &Compilation,
        caret: usize,
    ) -> Vec<CompletionItem> {
        let model = &compilation.model;
        let mut items = Vec::new();

        for (name, ty) in model.locals_at(caret) {
            items.push(CompletionItem::new(name, CompletionKind::Variable, Some(ty.to_string())));
        }
        for (name, ty) in model.globals.visible_variables() {
            items.push(CompletionItem::new(name, CompletionKind::Variable, Some(ty.to_string())));
        }
        for t in model.imports.imported_types() {
            items.push(import_item(Import::Type(t), None));
        }
        for ns in model.imports.root_namespaces() {
            items.push(import_item(Import::Namespace(ns), None));
        }
        for keyword in KEYWORDS {
            items.push(CompletionItem::new(*keyword, CompletionKind::Keyword, None));
        }
        items
    }
}

fn is_word(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier(_)) || kind.is_keyword()
}

/// Tokens that can start or continue a receiver expression at bracket depth zero
fn is_term(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::IntLiteral(_)
            | TokenKind::DoubleLiteral(_)
            | TokenKind::StringLiteral(_)
            | TokenKind::KwTrue
            | TokenKind::KwFalse
    )
}

/// Index of the first token of the receiver ending right before `dot`
fn receiver_start(
    tokens: &[&Token],
    dot: usize,
) -> usize {
    let mut depth = 0usize;
    let mut start = dot;
    let mut last_was_term = false;

    for i in (0..dot).rev() {
        let kind = &tokens[i].kind;
        match kind {
            TokenKind::RParen => {
                if depth == 0 && last_was_term {
                    break;
                }
                depth += 1;
                last_was_term = false;
            }
            TokenKind::LParen if depth == 0 => break,
            TokenKind::LParen => {
                // a call target may sit left of the closed group
                depth -= 1;
                last_was_term = false;
            }
            _ if depth > 0 => {}
            TokenKind::Dot => last_was_term = false,
            k if is_term(k) => {
                if last_was_term {
                    break;
                }
                last_was_term = true;
            }
            _ => break,
        }
        start = i;
    }
    start
}

fn member_item(member: &Member) -> CompletionItem {
    let kind = match member.kind {
        MemberKind::Method => CompletionKind::Method,
        MemberKind::Property => CompletionKind::Property,
        MemberKind::Field => CompletionKind::Field,
    };
    CompletionItem::new(member.name, kind, Some(member.signature()))
}

fn import_item(
    import: Import,
    parent: Option<&str>,
) -> CompletionItem {
    match import {
        Import::Type(t) => CompletionItem::new(t.name, CompletionKind::Type, Some(t.full_name())),
        Import::Namespace(ns) => {
            let label = parent
                .and_then(|p| ns.strip_prefix(p))
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(ns);
            CompletionItem::new(label, CompletionKind::Namespace, Some(ns.to_string()))
        }
    }
}

/// Whether `caret` sits inside a string literal or a comment
fn inside_literal_or_comment(
    tokens: &[Token],
    caret: usize,
) -> bool {
    tokens.iter().any(|t| match &t.kind {
        TokenKind::StringLiteral(_) => t.span.start < caret && caret < t.span.end,
        TokenKind::Comment(_) => t.span.start < caret && caret <= t.span.end,
        _ => false,
    })
}
