//! General REPL commands (help, quit, tokens, env, builtins)

use crate::commands::{CommandContext, CommandResult, EXIT_SENTINEL};
use crate::runner::format_tokens;
use colored::*;
use nepali_core::parser::get_registry;

/// Handle `:help` command
pub fn cmd_help(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    print_help(ctx);
    CommandResult::Success
}

/// Handle `:quit` and `:exit`
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `:tokens <source>` command
pub fn cmd_tokens(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: :tokens <source>".to_string());
    }
    CommandResult::Message(format_tokens(args))
}

/// Handle `:env` command
pub fn cmd_env(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let env = ctx.environment.borrow();
    let names = env.current_scope_names();
    if names.is_empty() {
        return CommandResult::Message("(no bindings)".to_string());
    }

    let lines: Vec<String> = names
        .into_iter()
        .filter_map(|name| env.get(name).map(|value| format!("{} = {}", name, value)))
        .collect();
    CommandResult::Message(lines.join("\n"))
}

/// Handle `:builtins` command
pub fn cmd_builtins(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    let lines: Vec<String> = get_registry()
        .get_documentation()
        .into_iter()
        .map(|doc| format!("  {} - {}", doc.signature.cyan(), doc.description))
        .collect();
    CommandResult::Message(lines.join("\n"))
}

/// Print help information
fn print_help(ctx: &CommandContext) {
    println!("{}", "नेपाली प्रोग्रामिङ भाषा".bold());
    println!("{}", "=======================".bold());
    println!();
    println!("{}", "Basic Usage:".green());
    println!("  {}               - Bind a value", "लेट x = ५;".cyan());
    println!("  {}         - Same, with the alternate keyword", "संख्या y = 10;".cyan());
    println!("  {}  - Function literal", "लेट जोड = फन(क, ख) { क + ख };".cyan());
    println!("  {}          - Conditional", "यदि x > 1 { x } अन्यथा { 0 }".cyan());
    println!("  {}              - Print a value", "लेख्नुहोस्(x)".cyan());
    println!();
    println!("{}", "Values:".green());
    println!("  {}  {}  {}  {}", "42".cyan(), "\"पाठ\"".cyan(), "सत्य".cyan(), "मिथ्या".cyan());
    println!("  {}          - Array", "[1, 2, 3][0]".cyan());
    println!("  {}    - Hash", "{\"नाम\": \"राम\"}[\"नाम\"]".cyan());
    println!();
    println!("{}", "Builtins:".green());
    for doc in get_registry().get_documentation() {
        println!("  {}", doc.signature.cyan());
    }
    println!();
    println!(
        "Function calls may nest {} deep.",
        ctx.config.max_depth.to_string().yellow()
    );
    println!();
    println!("{}", "Commands:".green());
    println!("  {}     - List the tokens of some source", ":tokens <src>".bright_green());
    println!("  {}              - Show global bindings", ":env".bright_green());
    println!("  {}         - List builtin functions", ":builtins".bright_green());
    println!("  {}             - Show this help", ":help".bright_green());
    println!(
        "  {} or {} - Exit the REPL",
        ":quit".bright_red(),
        EXIT_SENTINEL.bright_red()
    );
}
