//! Compiler diagnostics
//!
//! Diagnostics are plain values attached to a compilation. They are never raised as
//! errors: the consumer (completion, highlighting, evaluation) decides what to do
//! with them.

use std::fmt;

use serde::Serialize;

use crate::util::span::{LineIndex, Span};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

impl Severity {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// Stable diagnostic codes
///
/// `RC0xxx` are syntax errors, `RC1xxx` binding/type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    UnexpectedCharacter,
    UnterminatedString,
    InvalidNumber,
    UnexpectedToken,
    ExpectedToken,
    MissingSemicolon,
    StatementNotAllowed,
    NestingTooDeep,
    UnknownName,
    UnknownMember,
    UnknownNamespace,
    TypeMismatch,
    ArgumentCount,
    Redeclaration,
    NotAssignable,
    VoidValue,
    UninferableType,
    UnknownReference,
}

impl DiagnosticCode {
    /// Code as printed to the user
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnexpectedCharacter => "RC0001",
            DiagnosticCode::UnterminatedString => "RC0002",
            DiagnosticCode::InvalidNumber => "RC0003",
            DiagnosticCode::UnexpectedToken => "RC0010",
            DiagnosticCode::ExpectedToken => "RC0011",
            DiagnosticCode::MissingSemicolon => "RC0012",
            DiagnosticCode::StatementNotAllowed => "RC0013",
            DiagnosticCode::NestingTooDeep => "RC0014",
            DiagnosticCode::UnknownName => "RC1001",
            DiagnosticCode::UnknownMember => "RC1002",
            DiagnosticCode::UnknownNamespace => "RC1003",
            DiagnosticCode::TypeMismatch => "RC1010",
            DiagnosticCode::ArgumentCount => "RC1011",
            DiagnosticCode::Redeclaration => "RC1012",
            DiagnosticCode::NotAssignable => "RC1013",
            DiagnosticCode::VoidValue => "RC1014",
            DiagnosticCode::UninferableType => "RC1015",
            DiagnosticCode::UnknownReference => "RC1020",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    /// Render as `line:col: error[RC1001]: message` against the given text
    pub fn render(
        &self,
        source: &str,
    ) -> String {
        let pos = LineIndex::new(source).position(source, self.span.start);
        format!("({}): {}", pos, self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// Whether any diagnostic in the list is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity.is_error())
}
