//! Side-channel output of an evaluation

use parking_lot::Mutex;

/// Receives text written by a running line (`Console.Write*`) and
/// messages emitted by command handlers
pub trait EvaluationLogger: Send + Sync {
    fn write_output(
        &self,
        text: &str,
    );

    fn write_error(
        &self,
        text: &str,
    );
}

/// Writes to the process's stdout/stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl EvaluationLogger for ConsoleLogger {
    fn write_output(
        &self,
        text: &str,
    ) {
        print!("{}", text);
    }

    fn write_error(
        &self,
        text: &str,
    ) {
        eprint!("{}", text);
    }
}

/// Discards everything; used while replaying predecessor lines
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl EvaluationLogger for NullLogger {
    fn write_output(
        &self,
        _text: &str,
    ) {
    }

    fn write_error(
        &self,
        _text: &str,
    ) {
    }
}

/// Collects output in memory
#[derive(Debug, Default)]
pub struct BufferLogger {
    output: Mutex<String>,
    errors: Mutex<String>,
}

impl BufferLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written with `write_output` so far
    pub fn output(&self) -> String {
        self.output.lock().clone()
    }

    /// Everything written with `write_error` so far
    pub fn errors(&self) -> String {
        self.errors.lock().clone()
    }

    /// Take and clear the collected output
    pub fn take_output(&self) -> String {
        std::mem::take(&mut *self.output.lock())
    }
}

impl EvaluationLogger for BufferLogger {
    fn write_output(
        &self,
        text: &str,
    ) {
        self.output.lock().push_str(text);
    }

    fn write_error(
        &self,
        text: &str,
    ) {
        self.errors.lock().push_str(text);
    }
}
