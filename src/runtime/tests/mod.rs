//! Interpreter tests

use std::sync::Arc;

use indexmap::IndexSet;

use crate::frontend::parser::{parse, SourceKind};
use crate::frontend::semantic::{bind, BindContext, Globals};
use crate::references::Reference;
use crate::runtime::{BufferLogger, Interpreter, RuntimeError, Value, MAX_STRING_LENGTH};
use crate::util::diagnostic::has_errors;

fn default_references() -> IndexSet<Reference> {
    ["System.Runtime", "System.Console", "System.Text"]
        .into_iter()
        .map(Reference::new)
        .collect()
}

/// Compile and run `lines` in order on one interpreter; returns the last
/// line's outcome
fn run_lines(
    lines: &[&str],
    logger: &BufferLogger,
    max_steps: u64,
) -> Result<Option<Value>, RuntimeError> {
    let references = default_references();
    let usings = vec!["System".to_string()];
    let mut interpreter = Interpreter::new(max_steps);
    let mut parent: Option<Arc<Globals>> = None;
    let mut last = Ok(None);

    for line in lines {
        let tree = parse(line, SourceKind::Script);
        let model = bind(
            &tree,
            BindContext {
                parent: parent.clone(),
                references: &references,
                implicit_usings: &usings,
            },
        );
        assert!(
            !has_errors(&tree.diagnostics) && !has_errors(&model.diagnostics),
            "line {:?} failed to compile: {:?} {:?}",
            line,
            tree.diagnostics,
            model.diagnostics
        );
        last = interpreter.execute(&tree, &model, logger);
        parent = Some(Arc::clone(&model.globals));
    }
    last
}

fn eval(source: &str) -> Result<Option<Value>, RuntimeError> {
    run_lines(&[source], &BufferLogger::new(), 10_000)
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), Ok(Some(Value::Int(7))));
    assert_eq!(eval("7 / 2"), Ok(Some(Value::Int(3))));
    assert_eq!(eval("-7 / 2"), Ok(Some(Value::Int(-3))));
    assert_eq!(eval("7 % 3"), Ok(Some(Value::Int(1))));
}

#[test]
fn test_mixed_arithmetic_promotes_to_double() {
    assert_eq!(eval("1 + 0.5"), Ok(Some(Value::Double(1.5))));
    assert_eq!(eval("double d = 3; d"), Ok(Some(Value::Double(3.0))));
}

#[test]
fn test_divide_by_zero() {
    assert_eq!(eval("1 / 0"), Err(RuntimeError::DivideByZero));
    assert_eq!(eval("var z = 0; 5 % z"), Err(RuntimeError::DivideByZero));
    assert_eq!(eval("1.0 / 0"), Ok(Some(Value::Double(f64::INFINITY))));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("\"a\" + 1 + true"), Ok(Some(Value::string("a1True"))));
    assert_eq!(eval("var s = \"x\"; s += 2; s"), Ok(Some(Value::string("x2"))));
}

#[test]
fn test_comparison_and_logic() {
    assert_eq!(eval("1 < 2 && 2.5 >= 2"), Ok(Some(Value::Bool(true))));
    assert_eq!(eval("\"a\" == \"b\" || !false"), Ok(Some(Value::Bool(true))));
}

#[test]
fn test_short_circuit_skips_right_operand() {
    assert_eq!(eval("false && 1 / 0 == 0"), Ok(Some(Value::Bool(false))));
}

#[test]
fn test_control_flow() {
    let result = eval("var i = 0; var sum = 0; while (i < 5) { i += 1; sum += i; } sum");
    assert_eq!(result, Ok(Some(Value::Int(15))));

    let result = eval("var x = 3; if (x > 2) x = 10; else x = 20; x");
    assert_eq!(result, Ok(Some(Value::Int(10))));
}

#[test]
fn test_block_locals_do_not_leak() {
    let result = eval("var x = 1; { var y = 5; x = y; } x");
    assert_eq!(result, Ok(Some(Value::Int(5))));
}

#[test]
fn test_console_output() {
    let logger = BufferLogger::new();
    let result = run_lines(&["Console.WriteLine(\"hi\"); Console.Write(1 + 1);"], &logger, 100);
    assert_eq!(result, Ok(None));
    assert_eq!(logger.output(), "hi\n2");
}

#[test]
fn test_void_result_is_none() {
    let logger = BufferLogger::new();
    assert_eq!(run_lines(&["Console.WriteLine(4)"], &logger, 100), Ok(None));
    assert_eq!(logger.output(), "4\n");
}

#[test]
fn test_library_calls() {
    assert_eq!(eval("Math.Max(3, 9)"), Ok(Some(Value::Int(9))));
    assert_eq!(eval("Math.Max(3, 9.5)"), Ok(Some(Value::Double(9.5))));
    assert_eq!(eval("System.Math.Abs(-4)"), Ok(Some(Value::Int(4))));
    assert_eq!(eval("Math.Round(2.5)"), Ok(Some(Value::Double(2.0))));
    assert_eq!(eval("Convert.ToInt32(\"42\")"), Ok(Some(Value::Int(42))));
    assert_eq!(eval("Math.PI > 3"), Ok(Some(Value::Bool(true))));
}

#[test]
fn test_library_errors() {
    assert_eq!(eval("Convert.ToInt32(\"abc\")"), Err(RuntimeError::format()));
    assert_eq!(
        eval("\"abc\".Substring(2, 5)"),
        Err(RuntimeError::ArgumentOutOfRange("length"))
    );
}

#[test]
fn test_substring_bounds() {
    assert_eq!(eval("\"abc\".Substring(1, 2)"), Ok(Some(Value::string("bc"))));
    assert_eq!(
        eval("\"abc\".Substring(1, 9223372036854775807)"),
        Err(RuntimeError::ArgumentOutOfRange("length"))
    );
    assert_eq!(
        eval("\"abc\".Substring(4, 0)"),
        Err(RuntimeError::ArgumentOutOfRange("startIndex"))
    );
}

#[test]
fn test_repeat_count_is_bounded() {
    assert_eq!(
        eval("System.Text.Strings.Repeat(\"ab\", 3)"),
        Ok(Some(Value::string("ababab")))
    );
    for count in ["-1", "9223372036854775807", "16777216"] {
        assert_eq!(
            eval(&format!("System.Text.Strings.Repeat(\"ab\", {})", count)),
            Err(RuntimeError::ArgumentOutOfRange("count")),
            "count {}",
            count
        );
    }
}

#[test]
fn test_concatenation_is_bounded() {
    let logger = BufferLogger::new();
    let result = run_lines(
        &["var s = \"ab\";", "while (true) { s = s + s; }"],
        &logger,
        10_000,
    );
    assert_eq!(result, Err(RuntimeError::StringTooLong(MAX_STRING_LENGTH)));
}

#[test]
fn test_string_members() {
    assert_eq!(eval("\"Hello\".Length"), Ok(Some(Value::Int(5))));
    assert_eq!(eval("\"Hello\".ToUpper()"), Ok(Some(Value::string("HELLO"))));
    assert_eq!(eval("\"Hello\".IndexOf(\"l\")"), Ok(Some(Value::Int(2))));
    assert_eq!(eval("42.ToString().Length"), Ok(Some(Value::Int(2))));
}

#[test]
fn test_variable_shadows_type_name() {
    assert_eq!(eval("var Math = \"m\"; Math.Length"), Ok(Some(Value::Int(1))));
}

#[test]
fn test_globals_persist_across_lines() {
    let logger = BufferLogger::new();
    let result = run_lines(&["var x = 20;", "var y = x + 1;", "x * 2 + y"], &logger, 100);
    assert_eq!(result, Ok(Some(Value::Int(61))));
}

#[test]
fn test_later_line_shadows_earlier() {
    let logger = BufferLogger::new();
    let result = run_lines(&["var x = 1;", "var x = \"one\";", "x"], &logger, 100);
    assert_eq!(result, Ok(Some(Value::string("one"))));
}

#[test]
fn test_step_budget() {
    let logger = BufferLogger::new();
    let result = run_lines(&["while (true) { }"], &logger, 50);
    assert_eq!(result, Err(RuntimeError::StepBudgetExceeded(50)));
}

#[test]
fn test_division_overflow() {
    let result = eval("var m = -9223372036854775807 - 1; m / -1");
    assert_eq!(result, Err(RuntimeError::Overflow));
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Bool(true).to_string(), "True");
    assert_eq!(Value::Double(2.5).to_string(), "2.5");
    assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::string("a\"b").display_result(), "\"a\\\"b\"");
    assert_eq!(Value::Int(3).display_result(), "3");
}

#[test]
fn test_value_serializes_tagged() {
    let json = serde_json::to_string(&Value::Int(3)).unwrap();
    assert_eq!(json, r#"{"type":"int","value":3}"#);
}
