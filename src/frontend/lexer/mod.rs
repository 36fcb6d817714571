//! Lexer module
//!
//! The lexer never fails: malformed input becomes `Error` tokens plus diagnostics so the
//! highlighter and the completion engine can still work on half-typed lines.

pub mod tokens;

use std::iter::Peekable;
use std::str::CharIndices;

use crate::util::diagnostic::{Diagnostic, DiagnosticCode};
use crate::util::span::Span;
use tokens::*;

/// Lexer output
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Tokens including comments, always terminated by `Eof`
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Lexed {
    /// Tokens the parser consumes (no comments)
    pub fn significant(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .cloned()
            .collect()
    }
}

/// Tokenize source code
pub fn tokenize(source: &str) -> Lexed {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    tokens.push(Token::new(
        TokenKind::Eof,
        Span::new(source.len(), source.len()),
    ));

    Lexed {
        tokens,
        diagnostics: lexer.diagnostics,
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Whether `c` can be part of an identifier (used by completion for the typed fragment)
pub fn is_identifier_char(c: char) -> bool {
    is_ident_continue(c)
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            diagnostics: Vec::new(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.source.len())
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Character after the next one
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn eat(
        &mut self,
        expected: char,
    ) -> bool {
        if self.peek_char() == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let (start, c) = self.chars.next()?;

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '*' => TokenKind::Star,
            '%' => TokenKind::Percent,
            '+' => {
                if self.eat('=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('=') {
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            '/' => {
                if self.eat('/') {
                    return Some(self.comment(start));
                }
                TokenKind::Slash
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::Neq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' if self.eat('&') => TokenKind::And,
            '|' if self.eat('|') => TokenKind::Or,
            '"' => return Some(self.string(start)),
            '#' => return Some(self.directive(start)),
            c if c.is_ascii_digit() => return Some(self.number(start)),
            c if is_ident_start(c) => return Some(self.identifier(start)),
            other => {
                let span = Span::new(start, start + other.len_utf8());
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::UnexpectedCharacter,
                    format!("unexpected character '{}'", other),
                    span,
                ));
                return Some(Token::new(TokenKind::Error(other.to_string()), span));
            }
        };

        let end = self.offset();
        Some(Token::new(kind, Span::new(start, end)))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn comment(
        &mut self,
        start: usize,
    ) -> Token {
        while matches!(self.peek_char(), Some(c) if c != '\n') {
            self.chars.next();
        }
        let end = self.offset();
        let text = self.source[start + 2..end].to_string();
        Token::new(TokenKind::Comment(text), Span::new(start, end))
    }

    fn string(
        &mut self,
        start: usize,
    ) -> Token {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, '"')) => break,
                Some((i, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, '0')) => value.push('\0'),
                    Some((_, '\\')) => value.push('\\'),
                    Some((_, '"')) => value.push('"'),
                    Some((j, other)) => {
                        self.diagnostics.push(Diagnostic::error(
                            DiagnosticCode::UnexpectedCharacter,
                            format!("unknown escape sequence '\\{}'", other),
                            Span::new(i, j + other.len_utf8()),
                        ));
                        value.push(other);
                    }
                    None => {
                        self.unterminated(start);
                        break;
                    }
                },
                Some((_, c)) => value.push(c),
                None => {
                    self.unterminated(start);
                    break;
                }
            }
        }
        let end = self.offset();
        Token::new(TokenKind::StringLiteral(value), Span::new(start, end))
    }

    fn unterminated(
        &mut self,
        start: usize,
    ) {
        self.diagnostics.push(Diagnostic::error(
            DiagnosticCode::UnterminatedString,
            "unterminated string literal",
            Span::new(start, self.source.len()),
        ));
    }

    fn number(
        &mut self,
        start: usize,
    ) -> Token {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.chars.next();
        }
        // `1.5` is a double, `1.ToString()` is member access on an int
        let is_double = self.peek_char() == Some('.')
            && matches!(self.peek_second(), Some(c) if c.is_ascii_digit());
        if is_double {
            self.chars.next();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                self.chars.next();
            }
        }

        let end = self.offset();
        let span = Span::new(start, end);
        let text = &self.source[start..end];
        let parsed = if is_double {
            text.parse::<f64>().ok().map(TokenKind::DoubleLiteral)
        } else {
            text.parse::<i64>().ok().map(TokenKind::IntLiteral)
        };

        match parsed {
            Some(kind) => Token::new(kind, span),
            None => {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::InvalidNumber,
                    format!("invalid number literal '{}'", text),
                    span,
                ));
                Token::new(TokenKind::Error(text.to_string()), span)
            }
        }
    }

    fn identifier(
        &mut self,
        start: usize,
    ) -> Token {
        while matches!(self.peek_char(), Some(c) if is_ident_continue(c)) {
            self.chars.next();
        }
        let end = self.offset();
        let word = &self.source[start..end];
        let kind = TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Identifier(word.to_string()));
        Token::new(kind, Span::new(start, end))
    }

    fn directive(
        &mut self,
        start: usize,
    ) -> Token {
        while matches!(self.peek_char(), Some(c) if is_ident_continue(c)) {
            self.chars.next();
        }
        let end = self.offset();
        let span = Span::new(start, end);
        if end == start + 1 {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticCode::UnexpectedCharacter,
                "expected directive name after '#'",
                span,
            ));
            return Token::new(TokenKind::Error("#".to_string()), span);
        }
        Token::new(
            TokenKind::Directive(self.source[start + 1..end].to_string()),
            span,
        )
    }
}

#[cfg(test)]
mod tests;
