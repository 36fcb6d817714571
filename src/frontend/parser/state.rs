//! Parser state and token stream management

use super::super::lexer::tokens::*;
use crate::util::diagnostic::{Diagnostic, DiagnosticCode};
use crate::util::span::Span;

/// Binding power levels for Pratt parser
pub const BP_LOWEST: u8 = 0;
pub const BP_OR: u8 = 20;
pub const BP_AND: u8 = 30;
pub const BP_EQ: u8 = 40;
pub const BP_CMP: u8 = 50;
pub const BP_ADD: u8 = 60;
pub const BP_MUL: u8 = 70;
pub const BP_UNARY: u8 = 80;

/// Deepest statement or expression nesting the parser accepts
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parser state for tracking position and errors
#[derive(Debug)]
pub struct ParserState {
    /// Significant tokens, terminated by `Eof`
    tokens: Vec<Token>,
    /// Current position in token stream
    pos: usize,
    /// Parsing diagnostics
    diagnostics: Vec<Diagnostic>,
    /// Active statement and expression recursion
    depth: usize,
}

impl ParserState {
    /// Create a new parser state
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Check if at end of token stream
    #[inline]
    pub fn at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    /// Get current token
    #[inline]
    pub fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Get current token kind
    #[inline]
    pub fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Check the current token kind
    #[inline]
    pub fn at(
        &self,
        kind: &TokenKind,
    ) -> bool {
        self.kind() == kind
    }

    /// Peek at nth token ahead
    #[inline]
    pub fn peek_nth(
        &self,
        n: usize,
    ) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    /// Span of the current token
    #[inline]
    pub fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the previously consumed token
    #[inline]
    pub fn prev_span(&self) -> Span {
        if self.pos == 0 {
            Span::new(0, 0)
        } else {
            self.tokens[(self.pos - 1).min(self.tokens.len() - 1)].span
        }
    }

    /// Advance to next token
    #[inline]
    pub fn bump(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    /// Skip a specific token
    #[inline]
    pub fn skip(
        &mut self,
        kind: &TokenKind,
    ) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Expect a specific token, report error if not found
    pub fn expect(
        &mut self,
        kind: &TokenKind,
        what: &str,
    ) -> bool {
        if self.skip(kind) {
            return true;
        }
        let code = if matches!(kind, TokenKind::Semicolon) {
            DiagnosticCode::MissingSemicolon
        } else {
            DiagnosticCode::ExpectedToken
        };
        let found = describe(self.kind());
        self.error(code, format!("expected {}, found {}", what, found), self.span());
        false
    }

    /// Expect an identifier
    pub fn expect_ident(&mut self) -> Option<super::ast::Ident> {
        if let TokenKind::Identifier(name) = self.kind() {
            let ident = super::ast::Ident {
                name: name.clone(),
                span: self.span(),
            };
            self.bump();
            Some(ident)
        } else {
            let found = describe(self.kind());
            self.error(
                DiagnosticCode::ExpectedToken,
                format!("expected identifier, found {}", found),
                self.span(),
            );
            None
        }
    }

    /// Record a diagnostic
    pub fn error(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) {
        self.diagnostics.push(Diagnostic::error(code, message, span));
    }

    /// Enter one nesting level; reports and refuses past [`MAX_NESTING_DEPTH`]
    pub fn enter_nesting(&mut self) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            self.nesting_error();
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Report code nested deeper than [`MAX_NESTING_DEPTH`] at the current token
    pub fn nesting_error(&mut self) {
        self.error(
            DiagnosticCode::NestingTooDeep,
            format!("code is nested more than {} levels deep", MAX_NESTING_DEPTH),
            self.span(),
        );
    }

    /// Report an unexpected token at the current position
    pub fn unexpected(&mut self) {
        let found = describe(self.kind());
        self.error(
            DiagnosticCode::UnexpectedToken,
            format!("unexpected {}", found),
            self.span(),
        );
    }

    /// Skip to the next statement boundary: past a `;`, or up to (not past) a `}`
    pub fn synchronize(&mut self) {
        while !self.at_end() {
            match self.kind() {
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::RBrace => return,
                _ => self.bump(),
            }
        }
    }

    /// Index of the current token
    #[inline]
    pub fn token_index(&self) -> usize {
        self.pos
    }

    /// Take the collected diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Number of diagnostics so far
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Human-readable token description for messages
pub fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Identifier(name) => format!("identifier '{}'", name),
        TokenKind::IntLiteral(n) => format!("number '{}'", n),
        TokenKind::DoubleLiteral(n) => format!("number '{}'", n),
        TokenKind::StringLiteral(_) => "string literal".to_string(),
        TokenKind::Directive(name) => format!("directive '#{}'", name),
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Error(text) => format!("'{}'", text),
        other => format!("'{}'", token_text(other)),
    }
}

fn token_text(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::KwUsing => "using",
        TokenKind::KwNamespace => "namespace",
        TokenKind::KwClass => "class",
        TokenKind::KwVar => "var",
        TokenKind::KwInt => "int",
        TokenKind::KwDouble => "double",
        TokenKind::KwString => "string",
        TokenKind::KwBool => "bool",
        TokenKind::KwVoid => "void",
        TokenKind::KwIf => "if",
        TokenKind::KwElse => "else",
        TokenKind::KwWhile => "while",
        TokenKind::KwTrue => "true",
        TokenKind::KwFalse => "false",
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::Assign => "=",
        TokenKind::PlusAssign => "+=",
        TokenKind::MinusAssign => "-=",
        TokenKind::Eq => "==",
        TokenKind::Neq => "!=",
        TokenKind::Lt => "<",
        TokenKind::Le => "<=",
        TokenKind::Gt => ">",
        TokenKind::Ge => ">=",
        TokenKind::And => "&&",
        TokenKind::Or => "||",
        TokenKind::Not => "!",
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::LBrace => "{",
        TokenKind::RBrace => "}",
        TokenKind::Comma => ",",
        TokenKind::Semicolon => ";",
        TokenKind::Dot => ".",
        _ => "token",
    }
}
