//! Token types

use crate::util::span::Span;

/// Token kind
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    KwUsing,
    KwNamespace,
    KwClass,
    KwVar,
    KwInt,
    KwDouble,
    KwString,
    KwBool,
    KwVoid,
    KwIf,
    KwElse,
    KwWhile,
    KwTrue,
    KwFalse,

    // Identifiers
    Identifier(String),

    // Literals
    IntLiteral(i64),
    DoubleLiteral(f64),
    StringLiteral(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    PlusAssign,
    MinusAssign,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Dot,

    /// `#name`, e.g. the `#r` reference directive
    Directive(String),

    // Trivia kept for highlighting
    Comment(String),

    // Special
    Eof,
    Error(String),
}

impl TokenKind {
    /// Keyword lookup
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "using" => TokenKind::KwUsing,
            "namespace" => TokenKind::KwNamespace,
            "class" => TokenKind::KwClass,
            "var" => TokenKind::KwVar,
            "int" => TokenKind::KwInt,
            "double" => TokenKind::KwDouble,
            "string" => TokenKind::KwString,
            "bool" => TokenKind::KwBool,
            "void" => TokenKind::KwVoid,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            _ => return None,
        })
    }

    /// Whether the token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwUsing
                | TokenKind::KwNamespace
                | TokenKind::KwClass
                | TokenKind::KwVar
                | TokenKind::KwInt
                | TokenKind::KwDouble
                | TokenKind::KwString
                | TokenKind::KwBool
                | TokenKind::KwVoid
                | TokenKind::KwIf
                | TokenKind::KwElse
                | TokenKind::KwWhile
                | TokenKind::KwTrue
                | TokenKind::KwFalse
        )
    }

    /// Whether the token names a built-in type (`int`, `string`, ...)
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwInt
                | TokenKind::KwDouble
                | TokenKind::KwString
                | TokenKind::KwBool
                | TokenKind::KwVoid
        )
    }

    /// Whether the token is an operator
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Assign
                | TokenKind::PlusAssign
                | TokenKind::MinusAssign
                | TokenKind::Eq
                | TokenKind::Neq
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
        )
    }

    /// Whether the parser should skip this token
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment(_))
    }
}

/// All keywords, used by identifier completion
pub const KEYWORDS: &[&str] = &[
    "bool", "class", "double", "else", "false", "if", "int", "namespace", "string", "true",
    "using", "var", "void", "while",
];

/// Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        span: Span,
    ) -> Self {
        Self { kind, span }
    }
}
