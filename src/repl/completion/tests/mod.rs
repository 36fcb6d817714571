//! Completion tests

use std::sync::Arc;

use crate::references::DefaultReferences;
use crate::repl::completion::synthesizer::{
    filter_candidates, synthesize, typed_fragment, WRAPPER_PREFIX,
};
use crate::repl::completion::*;
use crate::repl::engine::{LineId, SubmissionStore};
use crate::workspace::Workspace;

fn setup() -> (SubmissionStore, CompletionSynthesizer) {
    let workspace = Arc::new(Workspace::new(DefaultReferences::builtin()));
    let store = SubmissionStore::new(Arc::clone(&workspace));
    let synthesizer = CompletionSynthesizer::new(workspace, store.chain_builder().clone());
    (store, synthesizer)
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

fn complete_at_end(
    store: &SubmissionStore,
    synthesizer: &CompletionSynthesizer,
    line: u64,
    code: &str,
) -> Vec<CompletionItem> {
    let unit = store.create_or_update(LineId(line), code, &[]);
    synthesizer.complete(&unit, code.len())
}

fn item(
    label: &str,
    kind: CompletionKind,
) -> CompletionItem {
    CompletionItem::new(label, kind, None)
}

// ---------------------------------------------------------------------------
// Fragment and filtering
// ---------------------------------------------------------------------------

#[test]
fn test_typed_fragment() {
    assert_eq!(typed_fragment("Math.Ma", 7), "Ma");
    assert_eq!(typed_fragment("Math.", 5), "");
    assert_eq!(typed_fragment("x + co", 6), "co");
    assert_eq!(typed_fragment("count", 3), "cou");
    assert_eq!(typed_fragment("", 0), "");
}

#[test]
fn test_synthesize_wraps_code() {
    let text = synthesize("x.");
    assert!(text.contains("void Main()"));
    let start = WRAPPER_PREFIX.len();
    assert_eq!(&text[start..start + 2], "x.");
}

#[test]
fn test_filter_ignores_case() {
    let raw = vec![
        item("Max", CompletionKind::Method),
        item("Min", CompletionKind::Method),
        item("maxValue", CompletionKind::Variable),
    ];
    let filtered = filter_candidates(raw, "MA");
    assert_eq!(labels(&filtered), vec!["Max", "maxValue"]);
}

#[test]
fn test_filter_deduplicates_preserving_order() {
    let raw = vec![
        item("Abs", CompletionKind::Method),
        item("Max", CompletionKind::Method),
        item("Abs", CompletionKind::Method),
        item("Max", CompletionKind::Method),
    ];
    let filtered = filter_candidates(raw, "");
    assert_eq!(labels(&filtered), vec!["Abs", "Max"]);
}

// ---------------------------------------------------------------------------
// Synthesized documents
// ---------------------------------------------------------------------------

#[test]
fn test_static_members() {
    let (store, synthesizer) = setup();
    let items = complete_at_end(&store, &synthesizer, 1, "Math.");
    let names = labels(&items);
    assert!(names.contains(&"Abs"));
    assert!(names.contains(&"Max"));
    assert!(names.contains(&"PI"));
    // overloads collapse into one entry
    assert_eq!(names.iter().filter(|n| **n == "Abs").count(), 1);
}

#[test]
fn test_member_prefix() {
    let (store, synthesizer) = setup();
    let items = complete_at_end(&store, &synthesizer, 1, "Math.Ma");
    assert_eq!(labels(&items), vec!["Max"]);
    assert_eq!(items[0].kind, CompletionKind::Method);
}

#[test]
fn test_string_members() {
    let (store, synthesizer) = setup();
    let items = complete_at_end(&store, &synthesizer, 1, "\"abc\".");
    let names = labels(&items);
    assert!(names.contains(&"Length"));
    assert!(names.contains(&"ToUpper"));
}

#[test]
fn test_call_chain_receiver() {
    let (store, synthesizer) = setup();
    let items = complete_at_end(&store, &synthesizer, 1, "\"abc\".ToUpper().Len");
    assert_eq!(labels(&items), vec!["Length"]);
    assert_eq!(items[0].kind, CompletionKind::Property);
}

#[test]
fn test_predecessor_variables() {
    let (store, synthesizer) = setup();
    store.create_or_update(LineId(1), "int counter = 5;", &[]);
    let items = complete_at_end(&store, &synthesizer, 2, "cou");
    let counter = items.iter().find(|i| i.label == "counter").unwrap();
    assert_eq!(counter.kind, CompletionKind::Variable);
    assert_eq!(counter.detail.as_deref(), Some("int"));
}

#[test]
fn test_predecessor_variable_members() {
    let (store, synthesizer) = setup();
    store.create_or_update(LineId(1), "var name = \"Ada\";", &[]);
    let items = complete_at_end(&store, &synthesizer, 2, "name.");
    assert!(labels(&items).contains(&"Length"));
}

#[test]
fn test_scope_candidates() {
    let (store, synthesizer) = setup();
    let items = complete_at_end(&store, &synthesizer, 1, "");
    let names = labels(&items);
    assert!(names.contains(&"Math"));
    assert!(names.contains(&"Console"));
    assert!(names.contains(&"System"));
    assert!(names.contains(&"while"));
}

#[test]
fn test_namespace_members() {
    let (store, synthesizer) = setup();
    let items = complete_at_end(&store, &synthesizer, 1, "System.");
    let names = labels(&items);
    assert!(names.contains(&"Math"));
    assert!(names.contains(&"Console"));
}

#[test]
fn test_no_completion_after_declaration_keyword() {
    let (store, synthesizer) = setup();
    assert!(complete_at_end(&store, &synthesizer, 1, "var ").is_empty());
    assert!(complete_at_end(&store, &synthesizer, 2, "int ").is_empty());
}

#[test]
fn test_no_completion_inside_string() {
    let (store, synthesizer) = setup();
    let code = "var s = \"Ma\";";
    let unit = store.create_or_update(LineId(1), code, &[]);
    assert!(synthesizer.complete(&unit, 11).is_empty());
}

#[test]
fn test_invalid_caret() {
    let (store, synthesizer) = setup();
    let unit = store.create_or_update(LineId(1), "Math.", &[]);
    assert!(synthesizer.complete(&unit, 6).is_empty());
    assert!(synthesizer.complete(&unit, 100).is_empty());
}

#[test]
fn test_completion_leaves_workspace_untouched() {
    let (store, synthesizer) = setup();
    let unit = store.create_or_update(LineId(1), "Math.", &[]);
    let before = store.workspace().current_solution();

    let items = synthesizer.complete(&unit, 5);
    assert!(!items.is_empty());

    let after = store.workspace().current_solution();
    assert_eq!(before.version(), after.version());
    assert_eq!(before.project_count(), after.project_count());
    assert_eq!(store.len(), 1);
}
