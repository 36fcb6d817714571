//! Parser tests

use crate::frontend::parser::ast::*;
use crate::frontend::parser::{parse, SourceKind, SyntaxTree};
use crate::util::diagnostic::DiagnosticCode;

fn script(source: &str) -> SyntaxTree {
    parse(source, SourceKind::Script)
}

fn codes(tree: &SyntaxTree) -> Vec<DiagnosticCode> {
    tree.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn test_parse_empty_script() {
    let tree = script("");
    assert!(tree.items.is_empty());
    assert!(tree.diagnostics.is_empty());
}

#[test]
fn test_declaration_and_result() {
    let tree = script("var x = 1; x + 1");
    assert!(tree.diagnostics.is_empty());
    let stmts: Vec<_> = tree.statements().collect();
    assert_eq!(stmts.len(), 2);
    assert!(matches!(
        stmts[0].kind,
        StmtKind::VarDecl { ty: TypeName::Var, ref name, init: Some(_), .. } if name.name == "x"
    ));
    assert!(matches!(
        tree.result_expr(),
        Some(Expr::Binary { op: BinOp::Add, .. })
    ));
}

#[test]
fn test_terminated_expression_is_not_result() {
    let tree = script("Console.WriteLine(1);");
    assert!(tree.diagnostics.is_empty());
    assert!(tree.result_expr().is_none());
}

#[test]
fn test_precedence() {
    let tree = script("1 + 2 * 3");
    let Some(Expr::Binary { op, right, .. }) = tree.result_expr() else {
        panic!("expected binary expression");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
}

#[test]
fn test_subtraction_is_left_associative() {
    let tree = script("10 - 2 - 3");
    let Some(Expr::Binary { left, .. }) = tree.result_expr() else {
        panic!("expected binary expression");
    };
    assert!(matches!(**left, Expr::Binary { op: BinOp::Sub, .. }));
}

#[test]
fn test_member_call_chain() {
    let tree = script("\"abc\".ToUpper().Length");
    assert!(tree.diagnostics.is_empty());
    let Some(Expr::Member { target, member, .. }) = tree.result_expr() else {
        panic!("expected member access");
    };
    assert_eq!(member.name, "Length");
    assert!(matches!(**target, Expr::Call { .. }));
}

#[test]
fn test_assignment_forms() {
    let tree = script("x = 1; x += 2; x -= 3");
    assert!(tree.diagnostics.is_empty());
    let ops: Vec<AssignOp> = tree
        .statements()
        .filter_map(|s| match s.kind {
            StmtKind::Assign { op, .. } => Some(op),
            _ => None,
        })
        .collect();
    assert_eq!(ops, vec![AssignOp::Set, AssignOp::Add, AssignOp::Sub]);
}

#[test]
fn test_using_and_reference_directives() {
    let tree = script("#r \"System.Text\"\nusing System.Text;\nStrings.Repeat(\"a\", 2)");
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    let stmts: Vec<_> = tree.statements().collect();
    assert!(matches!(
        stmts[0].kind,
        StmtKind::Reference { ref target, .. } if target == "System.Text"
    ));
    assert!(matches!(
        stmts[1].kind,
        StmtKind::Using { ref path } if path_to_string(path) == "System.Text"
    ));
}

#[test]
fn test_control_flow() {
    let tree = script("var i = 0; while (i < 3) { i += 1; } if (i == 3) i = 0; else { i = 1; }");
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    let stmts: Vec<_> = tree.statements().collect();
    assert!(matches!(stmts[1].kind, StmtKind::While { .. }));
    assert!(matches!(
        stmts[2].kind,
        StmtKind::If {
            else_branch: Some(_),
            ..
        }
    ));
}

#[test]
fn test_missing_semicolon_between_statements() {
    let tree = script("var x = 1 var y = 2;");
    assert_eq!(codes(&tree), vec![DiagnosticCode::MissingSemicolon]);
}

#[test]
fn test_recovers_after_bad_statement() {
    let tree = script("var = ; var y = 2; y");
    assert!(!tree.diagnostics.is_empty());
    assert!(tree.result_expr().is_some());
    assert!(tree.statements().any(|s| matches!(
        s.kind,
        StmtKind::VarDecl { ref name, .. } if name.name == "y"
    )));
}

#[test]
fn test_stray_closing_brace_terminates() {
    let tree = script("} 1");
    assert_eq!(codes(&tree)[0], DiagnosticCode::UnexpectedToken);
    assert!(tree.result_expr().is_some());
}

#[test]
fn test_using_in_block_is_reported() {
    let tree = script("{ using System; }");
    assert_eq!(codes(&tree), vec![DiagnosticCode::StatementNotAllowed]);
}

#[test]
fn test_incomplete_member_access() {
    let tree = script("Math.");
    assert_eq!(codes(&tree), vec![DiagnosticCode::ExpectedToken]);
}

#[test]
fn test_regular_document() {
    let source = "namespace Submission {\n    class Program {\n        void Main() {\n            var s = \"x\";\n            s.Length;\n        }\n    }\n}";
    let tree = parse(source, SourceKind::Regular);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    let Item::Namespace(ns) = &tree.items[0] else {
        panic!("expected namespace");
    };
    assert_eq!(path_to_string(&ns.path), "Submission");
    assert_eq!(ns.classes[0].name.name, "Program");
    let main = &ns.classes[0].methods[0];
    assert_eq!(main.return_type, TypeName::Void);
    assert_eq!(main.body.stmts.len(), 2);
}

#[test]
fn test_regular_document_rejects_top_level_statements() {
    let tree = parse("var x = 1;", SourceKind::Regular);
    assert_eq!(codes(&tree), vec![DiagnosticCode::StatementNotAllowed]);
}

#[test]
fn test_trailing_result_not_allowed_in_regular_method() {
    let source = "namespace N { class C { void M() { 1 + 1 } } }";
    let tree = parse(source, SourceKind::Regular);
    assert_eq!(codes(&tree), vec![DiagnosticCode::MissingSemicolon]);
}

#[test]
fn test_namespace_in_script_is_skipped() {
    let tree = script("namespace N { class C { } } 5");
    assert_eq!(codes(&tree), vec![DiagnosticCode::StatementNotAllowed]);
    assert!(matches!(
        tree.result_expr(),
        Some(Expr::Lit(Literal::Int(5), _))
    ));
}

#[test]
fn test_nesting_within_limit() {
    let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    let tree = script(&source);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    assert!(matches!(
        tree.result_expr(),
        Some(Expr::Lit(Literal::Int(1), _))
    ));
}

#[test]
fn test_deep_parentheses_are_reported() {
    let source = format!("{}1{}", "(".repeat(1_000), ")".repeat(1_000));
    let tree = script(&source);
    assert_eq!(codes(&tree), vec![DiagnosticCode::NestingTooDeep]);
    assert!(tree.result_expr().is_none());
}

#[test]
fn test_long_operator_chain_is_reported() {
    let source = vec!["1"; 1_000].join(" + ");
    let tree = script(&source);
    assert_eq!(codes(&tree), vec![DiagnosticCode::NestingTooDeep]);
}

#[test]
fn test_deep_unary_and_calls_are_reported() {
    let tree = script(&format!("{}1", "-".repeat(1_000)));
    assert_eq!(codes(&tree), vec![DiagnosticCode::NestingTooDeep]);

    let source = format!("{}1{}", "Math.Abs(".repeat(1_000), ")".repeat(1_000));
    let tree = script(&source);
    assert_eq!(codes(&tree), vec![DiagnosticCode::NestingTooDeep]);
}

#[test]
fn test_deep_blocks_are_reported() {
    let source = format!("{}{}", "{".repeat(1_000), "}".repeat(1_000));
    let tree = script(&source);
    assert_eq!(tree.diagnostics[0].code, DiagnosticCode::NestingTooDeep);

    let nested_ifs = format!("{}x = 1;", "if (true) ".repeat(1_000));
    let tree = script(&nested_ifs);
    assert!(codes(&tree).contains(&DiagnosticCode::NestingTooDeep));
}
