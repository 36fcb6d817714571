//! Service façade: initialization barrier, events, isolation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use replchain::repl::{
    ConfigurationLoaded, LineEvaluationResult, LineId, ReplService, ReplServiceBuilder,
    ServiceObserver,
};
use replchain::runtime::{BufferLogger, EvaluationLogger, Value};
use replchain::util::config::{ThemeConfig, UserConfiguration};
use replchain::util::diagnostic::DiagnosticCode;

/// Records events and whether any operation had completed when they arrived
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<ConfigurationLoaded>>,
    operation_done: AtomicBool,
    seen_after_operation: AtomicBool,
    delay: Option<Duration>,
}

impl ServiceObserver for Recorder {
    fn on_configuration_loaded(
        &self,
        event: &ConfigurationLoaded,
    ) {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.operation_done.load(Ordering::SeqCst) {
            self.seen_after_operation.store(true, Ordering::SeqCst);
        }
        self.events.lock().push(*event);
    }
}

fn logger() -> Arc<dyn EvaluationLogger> {
    Arc::new(BufferLogger::new())
}

#[tokio::test]
async fn test_operations_wait_for_initialization() {
    let recorder = Arc::new(Recorder {
        delay: Some(Duration::from_millis(100)),
        ..Recorder::default()
    });
    let service = ReplServiceBuilder::new(UserConfiguration::default())
        .observer(recorder.clone())
        .start();

    let result = service
        .evaluate(LineId(1), "1 + 1", logger())
        .await
        .unwrap();
    recorder.operation_done.store(true, Ordering::SeqCst);

    assert_eq!(result.value(), Some(&Value::Int(2)));
    assert!(service.is_initialized());
    assert_eq!(recorder.events.lock().len(), 1);
    assert!(!recorder.seen_after_operation.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_configuration_event_fires_once() {
    let recorder = Arc::new(Recorder::default());
    let service = ReplServiceBuilder::new(UserConfiguration::default())
        .observer(recorder.clone())
        .start();

    let mut tasks = Vec::new();
    for line in 1..=8u64 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service.highlight(LineId(line), "var x = 1;").await
        }));
    }
    for task in tasks {
        assert!(!task.await.unwrap().unwrap().is_empty());
    }

    let events = recorder.events.lock();
    assert_eq!(events.len(), 1);
    let theme = ThemeConfig::default();
    assert_eq!(events[0].background, theme.background);
    assert_eq!(events[0].foreground, theme.foreground);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_wait_does_not_rebuild() {
    let recorder = Arc::new(Recorder {
        delay: Some(Duration::from_millis(50)),
        ..Recorder::default()
    });
    let service = ReplServiceBuilder::new(UserConfiguration::default())
        .observer(recorder.clone())
        .start();

    let first = tokio::time::timeout(Duration::from_millis(1), service.ready()).await;
    assert!(first.is_err());
    let stale = tokio::time::timeout(
        Duration::from_millis(1),
        service.complete_code(LineId(1), "Math.", 5),
    )
    .await;
    assert!(stale.is_err());

    service.ready().await.unwrap();
    let result = service.evaluate(LineId(1), "2 * 21", logger()).await.unwrap();
    assert_eq!(result.value(), Some(&Value::Int(42)));
    assert_eq!(recorder.events.lock().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deep_nesting_is_a_diagnostic() {
    let service = ReplService::start(UserConfiguration::default());
    let code = format!("{}1{}", "(".repeat(1_000), ")".repeat(1_000));

    let spans = service.highlight(LineId(1), &code).await.unwrap();
    assert!(!spans.is_empty());
    service.complete_code(LineId(1), &code, 500).await.unwrap();

    let result = service.evaluate(LineId(1), &code, logger()).await.unwrap();
    let LineEvaluationResult::CompileError { diagnostics } = result else {
        panic!("expected a compile error, got {:?}", result);
    };
    assert_eq!(diagnostics[0].code, DiagnosticCode::NestingTooDeep);
}

#[tokio::test]
async fn test_oversized_string_arguments_fail_the_line() {
    let service = ReplService::start(UserConfiguration::default());
    let lines = [
        "\"abc\".Substring(1, 9223372036854775807)",
        "#r \"System.Text\"",
        "using System.Text; Strings.Repeat(\"ab\", 9223372036854775807)",
    ];
    let mut results = Vec::new();
    for (i, code) in lines.iter().enumerate() {
        let line = LineId(i as u64 + 1);
        results.push(service.evaluate(line, code, logger()).await.unwrap());
    }
    assert!(matches!(results[0], LineEvaluationResult::RuntimeError { .. }));
    assert!(results[1].is_success());
    assert!(matches!(results[2], LineEvaluationResult::RuntimeError { .. }));
}

#[tokio::test]
async fn test_completion_does_not_change_evaluation() {
    let service = ReplService::start(UserConfiguration::default());
    service
        .evaluate(LineId(1), "var word = \"chain\";", logger())
        .await
        .unwrap();

    let code = "word.Length";
    for caret in 0..=code.len() {
        service.complete_code(LineId(2), code, caret).await.unwrap();
    }
    let items = service.complete_code(LineId(2), "word.", 5).await.unwrap();
    assert!(items.iter().any(|i| i.label == "Length"));

    let result = service.evaluate(LineId(2), code, logger()).await.unwrap();
    assert_eq!(result.value(), Some(&Value::Int(5)));
    assert_eq!(service.lines().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_exit_and_directives() {
    let service = ReplService::start(UserConfiguration::default());
    let output = Arc::new(BufferLogger::new());

    let result = service
        .evaluate(LineId(1), "#r \"nuget: Humanizer\"", output.clone())
        .await
        .unwrap();
    assert!(result.is_success());
    assert!(output.output().contains("Humanizer"));

    let result = service
        .evaluate(LineId(2), "using Humanizer; Numbers.ToOrdinal(2)", logger())
        .await
        .unwrap();
    assert_eq!(result.value(), Some(&Value::string("2nd")));

    let result = service.evaluate(LineId(3), "#exit", logger()).await.unwrap();
    assert_eq!(result, LineEvaluationResult::Exit);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lines() {
    let service = ReplService::start(UserConfiguration::default());

    let mut tasks = Vec::new();
    for line in 1..=32u64 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            let code = format!("int v{} = {};", line, line);
            service.evaluate(LineId(line), &code, logger()).await
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().unwrap().is_success());
    }

    let lines = service.lines().await.unwrap();
    assert_eq!(lines.len(), 32);
    for (i, unit) in lines.iter().enumerate() {
        assert_eq!(unit.line_id(), LineId(i as u64 + 1));
        assert_eq!(unit.code(), format!("int v{} = {};", i + 1, i + 1));
    }
}
