//! Lexer tests

use crate::frontend::lexer::tokenize;
use crate::frontend::lexer::tokens::TokenKind;
use crate::util::diagnostic::DiagnosticCode;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_declaration_tokens() {
    assert_eq!(
        kinds("int x = 1;"),
        vec![
            TokenKind::KwInt,
            TokenKind::Identifier("x".to_string()),
            TokenKind::Assign,
            TokenKind::IntLiteral(1),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_compound_operators() {
    assert_eq!(
        kinds("a += 1 -= <= >= == != && || !"),
        vec![
            TokenKind::Identifier("a".to_string()),
            TokenKind::PlusAssign,
            TokenKind::IntLiteral(1),
            TokenKind::MinusAssign,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::Eq,
            TokenKind::Neq,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_double_versus_member_access_on_int() {
    assert_eq!(
        kinds("1.5"),
        vec![TokenKind::DoubleLiteral(1.5), TokenKind::Eof]
    );
    assert_eq!(
        kinds("1.ToString"),
        vec![
            TokenKind::IntLiteral(1),
            TokenKind::Dot,
            TokenKind::Identifier("ToString".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\n\"b\"""#),
        vec![
            TokenKind::StringLiteral("a\n\"b\"".to_string()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_unterminated_string_still_yields_token() {
    let lexed = tokenize("\"abc");
    assert_eq!(
        lexed.tokens[0].kind,
        TokenKind::StringLiteral("abc".to_string())
    );
    assert_eq!(lexed.diagnostics.len(), 1);
    assert_eq!(
        lexed.diagnostics[0].code,
        DiagnosticCode::UnterminatedString
    );
}

#[test]
fn test_comment_is_kept_but_not_significant() {
    let lexed = tokenize("x // note");
    assert!(matches!(lexed.tokens[1].kind, TokenKind::Comment(ref c) if c == " note"));
    let significant = lexed.significant();
    assert_eq!(significant.len(), 2);
    assert_eq!(significant[1].kind, TokenKind::Eof);
}

#[test]
fn test_reference_directive() {
    let lexed = tokenize("#r \"System.Text\"");
    assert_eq!(lexed.tokens[0].kind, TokenKind::Directive("r".to_string()));
    assert_eq!(
        lexed.tokens[1].kind,
        TokenKind::StringLiteral("System.Text".to_string())
    );
    assert!(lexed.diagnostics.is_empty());
}

#[test]
fn test_unexpected_character_is_recovered() {
    let lexed = tokenize("a @ b");
    assert_eq!(lexed.tokens.len(), 4);
    assert_eq!(lexed.tokens[1].kind, TokenKind::Error("@".to_string()));
    assert_eq!(lexed.diagnostics[0].code, DiagnosticCode::UnexpectedCharacter);
}

#[test]
fn test_integer_overflow_is_diagnostic() {
    let lexed = tokenize("99999999999999999999");
    assert_eq!(lexed.diagnostics[0].code, DiagnosticCode::InvalidNumber);
}

#[test]
fn test_spans_are_byte_offsets() {
    let lexed = tokenize("var ünï = 1;");
    let ident = &lexed.tokens[1];
    assert_eq!(ident.kind, TokenKind::Identifier("ünï".to_string()));
    assert_eq!(ident.span.slice("var ünï = 1;"), Some("ünï"));
}
