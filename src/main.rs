use anyhow::Result;
use clap::Parser;
use colored::*;
use nepali::runner::{run_file, RunOptions};
use nepali::EvalConfig;
use nepali_core::parser::evaluator::DEFAULT_MAX_DEPTH;
use std::path::PathBuf;
use std::process::ExitCode;

/// Interpreter for the Nepali programming language. Runs FILE, or starts a
/// REPL when no file is given.
#[derive(Parser, Debug)]
#[command(name = "nepali", version, about, long_about = None)]
struct Cli {
    /// Source file to run
    file: Option<PathBuf>,

    /// Print the token stream before running the file
    #[arg(long)]
    tokens: bool,

    /// Maximum depth of nested function calls
    #[arg(long, env = "NEPALI_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

/// Enable with `RUST_LOG=nepali_core=debug`
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = EvalConfig::with_max_depth(cli.max_depth);

    match cli.file {
        Some(path) => {
            let options = RunOptions {
                dump_tokens: cli.tokens,
                config,
            };
            Ok(run_file(&path, &options)?.exit_code())
        }
        None => {
            nepali::repl::start(config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
