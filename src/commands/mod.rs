//! Command registry for REPL commands
//!
//! Lines starting with a registered prefix are handled here instead of being
//! evaluated as source code.

pub mod general;

use nepali_core::{EvalConfig, SharedEnvironment};

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, evaluate the line as source
    NotACommand,
    /// Error occurred
    Error(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub environment: SharedEnvironment,
    pub config: EvalConfig,
}

impl CommandContext {
    pub fn new(environment: SharedEnvironment, config: EvalConfig) -> Self {
        Self {
            environment,
            config,
        }
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Line that ends the session, like `:quit`. Only the whole line counts: the
/// word is an ordinary identifier anywhere else.
pub const EXIT_SENTINEL: &str = "अन्त्य";

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register(":help", general::cmd_help);
    registry.register(":quit", general::cmd_quit);
    registry.register(":exit", general::cmd_quit);
    registry.register(":tokens", general::cmd_tokens);
    registry.register(":env", general::cmd_env);
    registry.register(":builtins", general::cmd_builtins);

    registry
}
