//! Line-based REPL with rustyline
//!
//! Each entered line gets the next line id. `:edit <id> <code>` resubmits an
//! earlier line; later lines see the new declarations the next time they run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use owo_colors::OwoColorize;
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{CompletionType, Editor};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::engine::LineId;
use super::result::LineEvaluationResult;
use super::service::ReplService;
use super::ReplError;
use crate::runtime::{ConsoleLogger, EvaluationLogger};

mod helper;
pub use helper::LineHelper;

#[derive(Debug, Error)]
pub enum LineReplError {
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),

    #[error(transparent)]
    Repl(#[from] ReplError),
}

/// What the loop does after a `:` command
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Help,
    Quit,
    Lines,
    Stats,
    Edit { line: LineId, code: String },
    Unknown(String),
}

impl MetaCommand {
    /// Parse a line starting with `:`
    pub fn parse(input: &str) -> MetaCommand {
        let body = input.trim_start_matches(':').trim_start();
        let (name, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
        match name {
            "help" | "h" => MetaCommand::Help,
            "quit" | "q" => MetaCommand::Quit,
            "lines" | "l" => MetaCommand::Lines,
            "stats" => MetaCommand::Stats,
            "edit" | "e" => {
                let rest = rest.trim_start();
                let (id, code) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match id.parse::<u64>() {
                    Ok(id) if id > 0 => MetaCommand::Edit {
                        line: LineId(id),
                        code: code.trim().to_string(),
                    },
                    _ => MetaCommand::Unknown(input.to_string()),
                }
            }
            _ => MetaCommand::Unknown(input.to_string()),
        }
    }
}

/// Interactive loop driving a [`ReplService`]
///
/// Runs on a plain thread; the runtime handle is used to wait on the service.
pub struct LineRepl {
    service: ReplService,
    runtime: Handle,
    editor: Editor<LineHelper, FileHistory>,
    current: Arc<AtomicU64>,
}

impl LineRepl {
    pub fn new(
        service: ReplService,
        runtime: Handle,
    ) -> Result<Self, LineReplError> {
        let repl_config = &service.config().repl;
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .max_history_size(repl_config.history_size)?
            .completion_type(CompletionType::List)
            .build();

        let current = Arc::new(AtomicU64::new(1));
        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(LineHelper::new(
            service.clone(),
            runtime.clone(),
            Arc::clone(&current),
        )));

        if let Some(path) = &repl_config.history_file {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    warn!("Could not load history from {}: {}", path.display(), e);
                }
            }
        }

        Ok(Self {
            service,
            runtime,
            editor,
            current,
        })
    }

    pub fn run(&mut self) -> Result<(), LineReplError> {
        println!("replchain {} - type :help for assistance", crate::VERSION);
        println!("Press Ctrl+D or :quit to exit\n");

        let result = self.run_loop();
        self.save_history();
        result
    }

    fn run_loop(&mut self) -> Result<(), LineReplError> {
        loop {
            let line_id = LineId(self.current.load(Ordering::SeqCst));
            let prompt = format!("[{}] {}", line_id, self.service.config().repl.prompt);

            let input = match self.editor.readline(&prompt) {
                Ok(input) => input,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => return Ok(()),
                Err(e) => return Err(e.into()),
            };
            if input.trim().is_empty() {
                continue;
            }
            self.editor.add_history_entry(input.as_str())?;

            if input.starts_with(':') {
                match MetaCommand::parse(&input) {
                    MetaCommand::Quit => return Ok(()),
                    MetaCommand::Help => print_help(),
                    MetaCommand::Lines => self.print_lines()?,
                    MetaCommand::Stats => self.print_stats()?,
                    MetaCommand::Edit { line, code } => {
                        if self.submit(line, &code)?.is_exit() {
                            return Ok(());
                        }
                    }
                    MetaCommand::Unknown(command) => {
                        println!("Unknown command: {} (try :help)", command)
                    }
                }
                continue;
            }

            let result = self.submit(line_id, &input)?;
            self.current.fetch_add(1, Ordering::SeqCst);
            if result.is_exit() {
                return Ok(());
            }
        }
    }

    /// Evaluate `code` as `line` and print the outcome
    fn submit(
        &self,
        line: LineId,
        code: &str,
    ) -> Result<LineEvaluationResult, LineReplError> {
        let logger: Arc<dyn EvaluationLogger> = Arc::new(ConsoleLogger);
        let result = self
            .runtime
            .block_on(self.service.evaluate(line, code, logger))?;
        debug!("Line {} finished: {:?}", line, result);

        match &result {
            LineEvaluationResult::Success { .. } | LineEvaluationResult::Exit => {
                for text in result.render(code) {
                    println!("{}", text);
                }
            }
            LineEvaluationResult::CompileError { .. } | LineEvaluationResult::RuntimeError { .. } => {
                for text in result.render(code) {
                    println!("{}", text.red());
                }
            }
        }
        Ok(result)
    }

    fn print_lines(&self) -> Result<(), LineReplError> {
        let lines = self.runtime.block_on(self.service.lines())?;
        for unit in lines {
            let marker = if unit.has_predecessor() { ' ' } else { '*' };
            println!("{:>4}{} {}", unit.line_id(), marker, unit.code());
        }
        Ok(())
    }

    fn print_stats(&self) -> Result<(), LineReplError> {
        let summary = self.runtime.block_on(self.service.summary())?;
        println!("Workspace version: {}", summary.version);
        println!("Projects: {}", summary.project_count);
        println!(
            "Compilations: {} ({} failed)",
            summary.total_compilations, summary.failed_compilations
        );
        Ok(())
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.service.config().repl.history_file {
            if let Err(e) = self.editor.save_history(path) {
                warn!("Could not save history to {}: {}", path.display(), e);
            }
        }
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  :help, :h              Show this help");
    println!("  :quit, :q              Exit the REPL");
    println!("  :lines, :l             List submitted lines (* = no predecessor)");
    println!("  :edit, :e <id> <code>  Replace the code of line <id> and run it");
    println!("  :stats                 Show workspace statistics");
    println!();
    println!("Line directives:");
    println!("  #r \"<library>\"                    Reference a library");
    println!("  #r \"nuget: <name>[, <version>]\"   Install a package");
    println!("  exit, quit, #exit                 End the session");
}
