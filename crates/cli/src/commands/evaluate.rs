use std::path::PathBuf;

use orderdesk_core::{to_canonical_json, AuditLog, OrderRuntime};

use crate::commands::{
    audit_log, exit_code_for, load_config, read_input, CommandResult, EXIT_INVALID_INPUT,
};

#[derive(Debug, Clone, Default)]
pub struct EvaluateArgs {
    pub input: Option<String>,
    pub file: Option<PathBuf>,
    pub log_id: Option<String>,
}

pub fn run(args: EvaluateArgs) -> CommandResult {
    let raw = match read_input(args.input, args.file.as_deref()) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure("evaluate", "input", format!("{error:#}"), EXIT_INVALID_INPUT)
        }
    };

    let runtime = OrderRuntime::default();
    let decision = match runtime
        .evaluate_str(&raw)
        .and_then(|evaluation| to_canonical_json(&evaluation.decision))
    {
        Ok(decision) => decision,
        Err(error) => return CommandResult::engine_failure(&error),
    };

    let Some(log_id) = args.log_id else {
        return CommandResult::raw(0, decision);
    };

    let config = match load_config("evaluate") {
        Ok(config) => config,
        Err(result) => return result,
    };
    match audit_log(&config).append(&log_id, &decision).and_then(|r| r.to_confirmation_json()) {
        Ok(confirmation) => CommandResult::raw(0, format!("{decision}\n{confirmation}")),
        Err(error) => CommandResult {
            exit_code: exit_code_for(&error),
            output: format!("{decision}\n{}", error.to_error_payload()),
        },
    }
}
