//! Pure formatting of agent events into coloured console text.
//!
//! Every function returns the exact text to print so it can be tested
//! without a terminal.

use crossterm::style::Stylize;

use conch_core::agent::{BlockedCommand, CancelReason};
use conch_tools::ExecutionResult;

const TOOL_PREVIEW_CHARS: usize = 40;

#[must_use]
pub fn welcome() -> String {
    format!("{}\n", "Welcome to the Assistant Shell Interface!".green().bold())
}

#[must_use]
pub fn prompt(text: &str) -> String {
    text.cyan().to_string()
}

#[must_use]
pub fn assistant(text: &str, internal: bool) -> String {
    let label = if internal {
        "Assistant (Internal):"
    } else {
        "Assistant:"
    };
    format!("{} {text}", label.yellow())
}

/// One line per tool call with a short preview of its output.
#[must_use]
pub fn tool_called(name: &str, output: &str) -> String {
    let preview: String = output.chars().take(TOOL_PREVIEW_CHARS).collect();
    format!("Calling tool: {name}: {preview}...").magenta().to_string()
}

#[must_use]
pub fn tool_failed(message: &str) -> String {
    message.red().to_string()
}

/// Numbered safe and blocked lists. Blocked lines name the rule that matched.
#[must_use]
pub fn proposals(safe: &[String], blocked: &[BlockedCommand]) -> String {
    let mut out = Vec::new();
    if !safe.is_empty() {
        out.push(format!(
            "\n{}",
            "The assistant suggests the following commands:".blue()
        ));
        for (i, cmd) in safe.iter().enumerate() {
            out.push(format!("{}. {cmd}", i + 1).green().to_string());
        }
    }
    if !blocked.is_empty() {
        out.push(format!(
            "\n{}",
            "The assistant suggested some unsafe commands:".blue()
        ));
        for (i, b) in blocked.iter().enumerate() {
            out.push(format!("{}. {} ({})", i + 1, b.command, b.rule).red().to_string());
        }
        out.push("These will be skipped!".blue().to_string());
    }
    out.join("\n")
}

#[must_use]
pub fn executing(command: &str) -> String {
    format!("\n{} {}", "Executing:".blue(), command.green())
}

#[must_use]
pub fn executed(result: &ExecutionResult) -> String {
    let line = result.to_string();
    if result.is_success() {
        line.green().to_string()
    } else {
        line.red().to_string()
    }
}

#[must_use]
pub fn cancelled(reason: CancelReason) -> String {
    let text = match reason {
        CancelReason::UserCancelled => "Execution cancelled by user.",
        CancelReason::InvalidSelection => "Invalid selection. Execution cancelled.",
    };
    text.red().to_string()
}

#[must_use]
pub fn finished() -> String {
    format!("\n{}", "Task completed.".green().bold())
}

/// Fatal error line printed by the binary before exiting non-zero.
#[must_use]
pub fn fatal(error: &str) -> String {
    format!("{} {error}", "An error occurred:".red())
}
