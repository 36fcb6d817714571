//! Semantic syntax highlighting
//!
//! Token classes come from the lexer; identifiers are refined with the
//! binder's symbol classification so that types, methods and variables get
//! their own colors.

use hashbrown::HashMap;
use serde::Serialize;

use crate::frontend::lexer::tokens::TokenKind;
use crate::frontend::semantic::SymbolClass;
use crate::frontend::Compilation;
use crate::repl::engine::SourceUnit;
use crate::util::config::{Color, ThemeConfig};
use crate::util::span::Span;

/// Highlighting class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Keyword,
    Type,
    Namespace,
    Method,
    Property,
    Variable,
    Number,
    String,
    Comment,
    Directive,
    Operator,
    Punctuation,
    Text,
}

/// A colored byte range of the line's code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorSpan {
    pub start: usize,
    pub end: usize,
    pub color: Color,
}

/// Maps classified tokens to theme colors
#[derive(Debug, Clone)]
pub struct Highlighter {
    theme: ThemeConfig,
}

impl Highlighter {
    pub fn new(theme: ThemeConfig) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    /// Color spans for `unit`, sorted by start and non-overlapping
    pub fn highlight(
        &self,
        unit: &SourceUnit,
    ) -> Vec<ColorSpan> {
        let Some(compilation) = unit.compilation() else {
            return Vec::new();
        };
        classify(&compilation)
            .into_iter()
            .map(|(span, class)| ColorSpan {
                start: span.start,
                end: span.end,
                color: self.color_for(class),
            })
            .collect()
    }

    pub fn color_for(
        &self,
        class: Classification,
    ) -> Color {
        let theme = &self.theme;
        match class {
            Classification::Keyword => theme.keyword,
            Classification::Type => theme.type_name,
            Classification::Method => theme.method,
            Classification::Property => theme.property,
            Classification::Variable => theme.variable,
            Classification::Number => theme.number,
            Classification::String => theme.string,
            Classification::Comment => theme.comment,
            Classification::Directive => theme.directive,
            Classification::Operator => theme.operator,
            Classification::Punctuation => theme.punctuation,
            Classification::Namespace | Classification::Text => theme.foreground,
        }
    }
}

/// Classify every non-empty token of a compiled document in source order
pub fn classify(compilation: &Compilation) -> Vec<(Span, Classification)> {
    let symbols: HashMap<Span, SymbolClass> = compilation.model.symbols.iter().copied().collect();

    compilation
        .tree
        .tokens
        .iter()
        .filter(|t| !t.span.is_empty())
        .map(|t| {
            let class = match &t.kind {
                TokenKind::Identifier(_) => match symbols.get(&t.span) {
                    Some(SymbolClass::Namespace) => Classification::Namespace,
                    Some(SymbolClass::Type) => Classification::Type,
                    Some(SymbolClass::Method) => Classification::Method,
                    Some(SymbolClass::Property | SymbolClass::Field) => Classification::Property,
                    Some(SymbolClass::Variable) => Classification::Variable,
                    None => Classification::Text,
                },
                TokenKind::IntLiteral(_) | TokenKind::DoubleLiteral(_) => Classification::Number,
                TokenKind::StringLiteral(_) => Classification::String,
                TokenKind::Comment(_) => Classification::Comment,
                TokenKind::Directive(_) => Classification::Directive,
                TokenKind::Error(_) | TokenKind::Eof => Classification::Text,
                kind if kind.is_keyword() => Classification::Keyword,
                kind if kind.is_operator() => Classification::Operator,
                _ => Classification::Punctuation,
            };
            (t.span, class)
        })
        .collect()
}

#[cfg(test)]
mod tests;
