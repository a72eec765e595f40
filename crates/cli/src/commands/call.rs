use orderdesk_core::{OrderRuntime, ToolDispatcher, ToolKind};
use serde_json::Value;

use crate::commands::{audit_log, load_config, read_input, CommandResult, EXIT_INVALID_INPUT};

pub fn run(request: Option<String>) -> CommandResult {
    let raw = match read_input(request, None) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure("call", "input", format!("{error:#}"), EXIT_INVALID_INPUT)
        }
    };
    let config = match load_config("call") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let dispatcher = ToolDispatcher::new(OrderRuntime::default(), audit_log(&config));
    let output = dispatcher.handle(&raw);
    let failed = serde_json::from_str::<Value>(&output)
        .map(|value| value.get("error").is_some())
        .unwrap_or(true);

    CommandResult::raw(if failed { EXIT_INVALID_INPUT } else { 0 }, output)
}

pub fn list() -> CommandResult {
    let lines: Vec<String> = ToolKind::ALL
        .iter()
        .map(|kind| format!("- {}: {}", kind.name(), kind.description()))
        .collect();
    CommandResult::raw(0, lines.join("\n"))
}
