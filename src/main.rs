//! replchain - CLI

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use replchain::repl::line::LineRepl;
use replchain::repl::{LineEvaluationResult, ReplService};
use replchain::runtime::{BufferLogger, ConsoleLogger, EvaluationLogger};
use replchain::util::config::{self, UserConfiguration};
use replchain::util::logger::{self, LogLevel};
use replchain::{evaluate_lines, NAME, VERSION};

/// Incremental line REPL for a small C#-like script language
#[derive(Parser, Debug)]
#[command(name = "replchain")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to use instead of the user configuration
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive REPL (default)
    Repl,

    /// Evaluate each argument as a consecutive REPL line
    Eval {
        /// Line code, one argument per line
        #[arg(value_name = "LINE", required = true)]
        lines: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the defaults to the configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => config::load_user_config().context("Failed to load user config")?,
    };
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log.level
    };
    logger::init_with_level(level);

    match args.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(config),
        Commands::Eval { lines, json } => run_eval(config, lines, json),
        Commands::Config { init } => show_config(&config, args.config, init),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn run_repl(config: UserConfiguration) -> Result<()> {
    let runtime = runtime()?;
    let service = {
        let _guard = runtime.enter();
        ReplService::start(config)
    };
    let mut repl = LineRepl::new(service, runtime.handle().clone()).context("Failed to start REPL")?;
    repl.run().context("REPL failed")?;
    Ok(())
}

fn run_eval(
    config: UserConfiguration,
    lines: Vec<String>,
    json: bool,
) -> Result<()> {
    let runtime = runtime()?;

    if json {
        let buffer = Arc::new(BufferLogger::new());
        let logger: Arc<dyn EvaluationLogger> = buffer.clone();
        let results = runtime
            .block_on(evaluate_lines(config, &lines[..], logger))
            .context("Evaluation failed")?;
        let results: Vec<serde_json::Value> = results
            .iter()
            .map(|(line, result)| serde_json::json!({ "line": line, "result": result }))
            .collect();
        let report = serde_json::json!({
            "results": results,
            "output": buffer.output(),
            "errors": buffer.errors(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let results = runtime
        .block_on(evaluate_lines(config, &lines[..], Arc::new(ConsoleLogger)))
        .context("Evaluation failed")?;
    for ((line, result), code) in results.iter().zip(&lines) {
        for text in result.render(code) {
            match result {
                LineEvaluationResult::CompileError { .. }
                | LineEvaluationResult::RuntimeError { .. } => {
                    eprintln!("{} {}", format!("[{}]", line).red(), text)
                }
                _ => println!("{}", text),
            }
        }
    }
    Ok(())
}

fn show_config(
    config: &UserConfiguration,
    explicit: Option<PathBuf>,
    init: bool,
) -> Result<()> {
    let path = explicit
        .or_else(config::get_config_path)
        .context("Cannot determine config directory")?;

    if init {
        config::save_config_to(&UserConfiguration::default(), &path)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
