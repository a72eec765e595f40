use orderdesk_core::AuditLog;

use crate::commands::{audit_log, load_config, CommandResult, EXIT_INTERNAL};

pub fn run(log_id: &str, json_output: bool) -> CommandResult {
    let config = match load_config("history") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let entries = match audit_log(&config).entries(log_id) {
        Ok(entries) => entries,
        Err(error) => return CommandResult::engine_failure(&error),
    };

    if json_output {
        return match serde_json::to_string_pretty(&entries) {
            Ok(json) => CommandResult::raw(0, json),
            Err(error) => {
                CommandResult::failure("history", "serialization", error.to_string(), EXIT_INTERNAL)
            }
        };
    }

    if entries.is_empty() {
        return CommandResult::raw(0, format!("no audit entries recorded for `{log_id}`"));
    }

    let mut lines = vec![format!("{} audit entries for `{log_id}`:", entries.len())];
    lines.extend(entries.iter().map(|entry| format!("- {} {}", entry.timestamp(), entry.payload)));
    CommandResult::raw(0, lines.join("\n"))
}
