//! REPL (Read-Eval-Print Loop) for the Nepali language

use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult, EXIT_SENTINEL};
use crate::runner::format_diagnostics;
use anyhow::Result;
use colored::*;
use nepali_core::{parse, EvalConfig, Environment, Evaluator, Object};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What a single input line produced
#[derive(Debug, PartialEq)]
pub enum LineOutcome {
    /// Blank line
    Empty,
    /// A command ran
    Command(CommandResult),
    /// Source was evaluated; `None` when it produced no value
    Evaluated(Option<Object>),
    /// Source did not parse; nothing was evaluated
    Diagnostics(Vec<String>),
}

/// State kept across lines: the global environment, the evaluator and the
/// command registry
pub struct Session {
    context: CommandContext,
    evaluator: Evaluator,
    commands: CommandRegistry,
}

impl Session {
    pub fn new(config: EvalConfig) -> Self {
        Self::with_evaluator(Evaluator::with_config(config))
    }

    pub fn with_evaluator(evaluator: Evaluator) -> Self {
        Session {
            context: CommandContext::new(Environment::new().into_shared(), *evaluator.config()),
            evaluator,
            commands: create_registry(),
        }
    }

    /// Run one line of input
    pub fn handle_line(&mut self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Empty;
        }
        if line == EXIT_SENTINEL {
            return LineOutcome::Command(CommandResult::Exit);
        }

        match self.commands.execute(line, &mut self.context) {
            CommandResult::NotACommand => {}
            result => return LineOutcome::Command(result),
        }

        let (program, errors) = parse(line);
        if !errors.is_empty() {
            return LineOutcome::Diagnostics(errors);
        }
        if program.is_empty() {
            return LineOutcome::Empty;
        }
        LineOutcome::Evaluated(self.evaluator.eval_program(&program, &self.context.environment))
    }
}

/// Interactive REPL for the Nepali language
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: EvalConfig) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        Ok(Repl {
            editor,
            session: Session::new(config),
        })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "नेपाली प्रोग्रामिङ भाषा".bright_cyan().bold());
        println!(
            "Type expressions like: {}, {}",
            "लेट x = ५;".cyan(),
            "लेख्नुहोस्(x + 1)".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            ":help".bright_green(),
            EXIT_SENTINEL.bright_red(),
            "Ctrl+C".bright_red()
        );

        loop {
            let prompt = format!("{} ", ">>".bright_magenta().bold());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    if !print_outcome(self.session.handle_line(&line)) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    println!("{} {:?}", "Error reading input:".bright_red().bold(), err);
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Print the outcome of a line. Returns false when the session should end.
fn print_outcome(outcome: LineOutcome) -> bool {
    match outcome {
        LineOutcome::Empty | LineOutcome::Evaluated(None) => {}
        LineOutcome::Evaluated(Some(Object::Error(error))) => {
            println!("{} {}", "Error:".bright_red().bold(), error.to_string().red());
        }
        LineOutcome::Evaluated(Some(value)) => println!("{}", value),
        LineOutcome::Diagnostics(errors) => println!("{}", format_diagnostics(&errors).red()),
        LineOutcome::Command(result) => match result {
            CommandResult::Success | CommandResult::NotACommand => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Error(e) => println!("{} {}", "Error:".bright_red().bold(), e.red()),
            CommandResult::Exit => {
                println!("{}", "Goodbye!".bright_cyan());
                return false;
            }
        },
    }
    true
}

/// Convenience function to start the REPL
pub fn start(config: EvalConfig) -> Result<()> {
    let mut repl = Repl::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}
