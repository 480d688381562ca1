//! Terminal rendering of transcript messages.

use parley_core::message::{Message, Role};
use parley_core::tool::ToolRegistry;

/// Longest tool output shown by `history` before it is cut.
const HISTORY_TOOL_PREVIEW: usize = 200;

/// Lines for a message produced during the current run.
///
/// User and tool messages are not echoed; the user just typed the one and
/// the model summarizes the other.
pub fn run_lines(message: &Message, tools: &ToolRegistry) -> Vec<String> {
    match message.role {
        Role::Assistant if message.is_terminal() => message
            .text()
            .lines()
            .map(|line| format!("  Assistant > {line}"))
            .collect(),
        Role::Assistant => match message.first_tool_call() {
            Some(call) if tools.requires_approval(call.name()) => vec![
                format!("  {} needs your approval: {}", call.name(), call.function.arguments),
                "  Reply with `parley ask \"yes\"` to go ahead or `parley ask \"no\"` to skip.".into(),
            ],
            Some(call) => vec![format!("  executing: {}", call.name())],
            None => Vec::new(),
        },
        Role::User | Role::Tool | Role::System => Vec::new(),
    }
}

/// Lines for one stored message in `history`.
pub fn history_lines(message: &Message) -> Vec<String> {
    match message.role {
        Role::User => vec![format!("  You > {}", message.text())],
        Role::Assistant if message.is_terminal() => message
            .text()
            .lines()
            .map(|line| format!("  Assistant > {line}"))
            .collect(),
        Role::Assistant => message
            .first_tool_call()
            .map(|call| vec![format!("  Assistant > [calls {}({})]", call.name(), call.function.arguments)])
            .unwrap_or_default(),
        Role::Tool => vec![format!("  Tool > {}", preview(message.text(), HISTORY_TOOL_PREVIEW))],
        Role::System => Vec::new(),
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{cut}…")
}

pub fn print_messages(messages: &[Message], tools: &ToolRegistry) {
    for message in messages {
        for line in run_lines(message, tools) {
            println!("{line}");
        }
    }
}

pub fn print_history(messages: &[Message]) {
    for message in messages {
        for line in history_lines(message) {
            println!("{line}");
        }
    }
}
