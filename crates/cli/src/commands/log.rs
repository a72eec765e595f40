use orderdesk_core::AuditLog;

use crate::commands::{audit_log, load_config, read_input, CommandResult, EXIT_INVALID_INPUT};

pub fn run(log_id: &str, payload: Option<String>) -> CommandResult {
    let payload = match read_input(payload, None) {
        Ok(payload) => payload,
        Err(error) => {
            return CommandResult::failure("log", "input", format!("{error:#}"), EXIT_INVALID_INPUT)
        }
    };
    let config = match load_config("log") {
        Ok(config) => config,
        Err(result) => return result,
    };

    match audit_log(&config).append(log_id, payload.trim_end()).and_then(|r| r.to_confirmation_json()) {
        Ok(confirmation) => CommandResult::raw(0, confirmation),
        Err(error) => CommandResult::engine_failure(&error),
    }
}
