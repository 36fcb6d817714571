//! Dispatcher and handler tests

use std::sync::Arc;

use crate::references::{CatalogInstaller, DefaultReferences, Reference};
use crate::repl::commands::*;
use crate::repl::engine::{Evaluator, LineId, SubmissionStore};
use crate::repl::result::LineEvaluationResult;
use crate::repl::ReplError;
use crate::runtime::{BufferLogger, EvaluationLogger, Value};
use crate::workspace::Workspace;

fn setup() -> (Arc<SubmissionStore>, Dispatcher) {
    let workspace = Arc::new(Workspace::new(DefaultReferences::builtin()));
    let store = Arc::new(SubmissionStore::new(workspace));
    let dispatcher = Dispatcher::standard(
        Arc::clone(&store),
        Evaluator::default(),
        Arc::new(CatalogInstaller),
    );
    (store, dispatcher)
}

fn run(
    dispatcher: &Dispatcher,
    line: u64,
    code: &str,
    logger: &BufferLogger,
) -> LineEvaluationResult {
    dispatcher
        .dispatch(code)
        .unwrap()
        .handle(LineId(line), code, logger)
}

// ---------------------------------------------------------------------------
// Dispatch order
// ---------------------------------------------------------------------------

#[test]
fn test_priority_order() {
    let (_, dispatcher) = setup();
    assert_eq!(
        dispatcher.handler_names(),
        vec!["exit", "assembly-reference", "package-reference", "evaluate"]
    );
}

#[test]
fn test_selection() {
    let (_, dispatcher) = setup();
    let cases = [
        ("exit", "exit"),
        ("quit;", "exit"),
        ("  #exit  ", "exit"),
        ("#r \"System.Text\"", "assembly-reference"),
        ("#r \"nuget: Humanizer, 2.14.1\";", "package-reference"),
        ("1 + 2", "evaluate"),
        ("exit()", "evaluate"),
        ("var exit = 1;", "evaluate"),
        ("#r \"System.Text\"\nvar x = 1;", "evaluate"),
        ("", "evaluate"),
    ];
    for (code, expected) in cases {
        assert_eq!(dispatcher.dispatch(code).unwrap().name(), expected, "code: {:?}", code);
    }
}

#[test]
fn test_no_catch_all_is_an_error() {
    let dispatcher = Dispatcher::new(vec![Arc::new(ExitHandler)]);
    match dispatcher.dispatch("1 + 1") {
        Err(ReplError::NoHandler(code)) => assert_eq!(code, "1 + 1"),
        other => panic!("expected NoHandler, got {:?}", other.map(|h| h.name())),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[test]
fn test_exit() {
    let (_, dispatcher) = setup();
    let logger = BufferLogger::new();
    assert!(run(&dispatcher, 1, "quit", &logger).is_exit());
}

#[test]
fn test_evaluate() {
    let (store, dispatcher) = setup();
    let logger = BufferLogger::new();
    let result = run(&dispatcher, 1, "Console.WriteLine(\"hi\"); 6 * 7", &logger);
    assert_eq!(result.value(), Some(&Value::Int(42)));
    assert_eq!(logger.output(), "hi\n");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_evaluate_uses_submitted_code() {
    let (store, dispatcher) = setup();
    let logger = BufferLogger::new();
    store.create_or_update(LineId(1), "1", &[]);
    let result = run(&dispatcher, 1, "2", &logger);
    assert_eq!(result.value(), Some(&Value::Int(2)));
    assert_eq!(store.get(LineId(1)).unwrap().code(), "2");
}

#[test]
fn test_evaluate_compile_error() {
    let (_, dispatcher) = setup();
    let logger = BufferLogger::new();
    let result = run(&dispatcher, 1, "int x = \"text\";", &logger);
    match result {
        LineEvaluationResult::CompileError { diagnostics } => assert!(!diagnostics.is_empty()),
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn test_assembly_reference() {
    let (store, dispatcher) = setup();
    let logger = BufferLogger::new();

    let result = run(&dispatcher, 1, "#r \"System.Text\"", &logger);
    assert!(result.is_success());
    assert_eq!(logger.take_output(), "Referenced System.Text\n");

    let unit = store.get(LineId(1)).unwrap();
    let project = unit.handle().project().unwrap();
    assert!(project.references().contains(&Reference::new("System.Text")));

    let result = run(&dispatcher, 2, "using System.Text; Strings.Reverse(\"abc\")", &logger);
    assert_eq!(result.value(), Some(&Value::string("cba")));
}

#[test]
fn test_unknown_assembly() {
    let (_, dispatcher) = setup();
    let logger = BufferLogger::new();
    let result = run(&dispatcher, 1, "#r \"Missing.Library\"", &logger);
    assert!(matches!(result, LineEvaluationResult::RuntimeError { .. }));
    assert!(logger.errors().contains("Missing.Library"));
}

#[test]
fn test_package_reference() {
    let (store, dispatcher) = setup();
    let logger = BufferLogger::new();

    let result = run(&dispatcher, 1, "#r \"nuget: Humanizer\"", &logger);
    assert!(result.is_success());
    assert_eq!(logger.take_output(), "Installed package Humanizer 2.14.1\n");
    let unit = store.get(LineId(1)).unwrap();
    let project = unit.handle().project().unwrap();
    assert!(project.references().contains(&Reference::new("Humanizer")));

    let result = run(&dispatcher, 2, "using Humanizer; Numbers.ToWords(3)", &logger);
    assert_eq!(result.value(), Some(&Value::string("three")));
}

#[test]
fn test_unknown_package_version() {
    let (_, dispatcher) = setup();
    let logger = BufferLogger::new();
    let result = run(&dispatcher, 1, "#r \"nuget: Humanizer, 9.9.9\"", &logger);
    match result {
        LineEvaluationResult::RuntimeError { message } => assert!(message.contains("9.9.9")),
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn test_handlers_share_logger_contract() {
    struct Recording(parking_lot::Mutex<Vec<String>>);
    impl EvaluationLogger for Recording {
        fn write_output(
            &self,
            text: &str,
        ) {
            self.0.lock().push(text.to_string());
        }

        fn write_error(
            &self,
            text: &str,
        ) {
            self.0.lock().push(format!("error: {}", text));
        }
    }

    let (_, dispatcher) = setup();
    let logger = Recording(parking_lot::Mutex::new(Vec::new()));
    let code = "Console.Write(1); Console.Write(2);";
    dispatcher
        .dispatch(code)
        .unwrap()
        .handle(LineId(1), code, &logger);
    assert_eq!(*logger.0.lock(), vec!["1".to_string(), "2".to_string()]);
}
