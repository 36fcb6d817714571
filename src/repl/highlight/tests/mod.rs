//! Highlighter tests

use std::sync::Arc;

use crate::references::DefaultReferences;
use crate::repl::engine::{LineId, SubmissionStore};
use crate::repl::highlight::*;
use crate::util::config::{Color, ThemeConfig};
use crate::workspace::Workspace;

fn store() -> SubmissionStore {
    SubmissionStore::new(Arc::new(Workspace::new(DefaultReferences::builtin())))
}

/// Text and class of every classified token of `code` on line `line`
fn classes(
    store: &SubmissionStore,
    line: u64,
    code: &str,
) -> Vec<(String, Classification)> {
    let unit = store.create_or_update(LineId(line), code, &[]);
    let compilation = unit.compilation().unwrap();
    classify(&compilation)
        .into_iter()
        .map(|(span, class)| (code[span.start..span.end].to_string(), class))
        .collect()
}

fn class_of(
    classes: &[(String, Classification)],
    text: &str,
) -> Classification {
    classes
        .iter()
        .find(|(t, _)| t == text)
        .map(|(_, c)| *c)
        .unwrap_or_else(|| panic!("no token {:?}", text))
}

#[test]
fn test_token_classes() {
    let store = store();
    let found = classes(&store, 1, "int x = Math.Max(1, 2) + 3; // done");
    assert_eq!(class_of(&found, "int"), Classification::Keyword);
    assert_eq!(class_of(&found, "x"), Classification::Variable);
    assert_eq!(class_of(&found, "Math"), Classification::Type);
    assert_eq!(class_of(&found, "Max"), Classification::Method);
    assert_eq!(class_of(&found, "1"), Classification::Number);
    assert_eq!(class_of(&found, "+"), Classification::Operator);
    assert_eq!(class_of(&found, ";"), Classification::Punctuation);
    assert_eq!(class_of(&found, "// done"), Classification::Comment);
}

#[test]
fn test_members_and_strings() {
    let store = store();
    let found = classes(&store, 1, "\"abc\".Length");
    assert_eq!(class_of(&found, "\"abc\""), Classification::String);
    assert_eq!(class_of(&found, "Length"), Classification::Property);
}

#[test]
fn test_namespaces_and_unknown_names() {
    let store = store();
    let found = classes(&store, 1, "System.Math.PI + missing");
    assert_eq!(class_of(&found, "System"), Classification::Namespace);
    assert_eq!(class_of(&found, "PI"), Classification::Property);
    assert_eq!(class_of(&found, "missing"), Classification::Text);
}

#[test]
fn test_predecessor_variable_is_classified() {
    let store = store();
    store.create_or_update(LineId(1), "var total = 1;", &[]);
    let found = classes(&store, 2, "total + 1");
    assert_eq!(class_of(&found, "total"), Classification::Variable);
}

#[test]
fn test_spans_sorted_and_disjoint() {
    let store = store();
    let unit = store.create_or_update(LineId(1), "if (true) { Console.WriteLine(\"hi\"); }", &[]);
    let spans = Highlighter::new(ThemeConfig::default()).highlight(&unit);
    assert!(!spans.is_empty());
    for pair in spans.windows(2) {
        assert!(pair[0].start < pair[0].end);
        assert!(pair[0].end <= pair[1].start);
    }
}

#[test]
fn test_theme_colors() {
    let theme = ThemeConfig {
        keyword: Color::rgb(1, 2, 3),
        ..ThemeConfig::default()
    };
    let highlighter = Highlighter::new(theme.clone());
    let store = store();
    let unit = store.create_or_update(LineId(1), "var x = 1;", &[]);
    let spans = highlighter.highlight(&unit);
    assert_eq!(spans[0].start, 0);
    assert_eq!(spans[0].end, 3);
    assert_eq!(spans[0].color, Color::rgb(1, 2, 3));
    assert_eq!(highlighter.color_for(Classification::Namespace), theme.foreground);
}
