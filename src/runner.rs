//! Running a source file from the command line

use anyhow::{Context, Result};
use colored::*;
use nepali_core::parser::Lexer;
use nepali_core::{parse, EvalConfig, Environment, Evaluator, Object};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

/// Header printed above parse diagnostics
pub const DIAGNOSTICS_HEADER: &str = "कोडमा त्रुटि छन्:";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print the token stream before evaluating
    pub dump_tokens: bool,
    pub config: EvalConfig,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    ParseFailed,
    RuntimeFailed,
}

impl RunStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::ParseFailed | RunStatus::RuntimeFailed => ExitCode::FAILURE,
        }
    }
}

/// One line per token: position, kind and literal
pub fn format_tokens(source: &str) -> String {
    Lexer::new(source)
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The diagnostics header followed by each message on its own indented line
pub fn format_diagnostics(errors: &[String]) -> String {
    let mut report = String::from(DIAGNOSTICS_HEADER);
    for error in errors {
        report.push_str("\n\t");
        report.push_str(error);
    }
    report
}

/// Read `path` and run it
pub fn run_file(path: &Path, options: &RunOptions) -> Result<RunStatus> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "running file");
    Ok(run_source(&source, options))
}

/// Parse and evaluate `source`, printing tokens, diagnostics and the result
pub fn run_source(source: &str, options: &RunOptions) -> RunStatus {
    if options.dump_tokens {
        println!("{}", format_tokens(source));
    }

    let (program, errors) = parse(source);
    if !errors.is_empty() {
        eprintln!("{}", format_diagnostics(&errors).red());
        return RunStatus::ParseFailed;
    }

    let env = Environment::new().into_shared();
    let mut evaluator = Evaluator::with_config(options.config);
    match evaluator.eval_program(&program, &env) {
        Some(Object::Error(error)) => {
            eprintln!("{} {}", "Error:".bright_red().bold(), error.to_string().red());
            RunStatus::RuntimeFailed
        }
        Some(value) => {
            println!("{}", value);
            RunStatus::Success
        }
        None => RunStatus::Success,
    }
}
