pub mod call;
pub mod config;
pub mod demo;
pub mod evaluate;
pub mod history;
pub mod log;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use orderdesk_core::config::{AppConfig, LoadOptions};
use orderdesk_core::{ApplicationError, ErrorKind, FileAuditLog};
use serde::Serialize;

pub const EXIT_OK: u8 = 0;
pub const EXIT_INTERNAL: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_STORAGE: u8 = 3;
pub const EXIT_CONFIG: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn raw(exit_code: u8, output: impl Into<String>) -> Self {
        Self { exit_code, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Engine failures keep the inline `{"error": ...}` shape callers expect.
    pub fn engine_failure(error: &ApplicationError) -> Self {
        Self { exit_code: exit_code_for(error), output: error.to_error_payload() }
    }
}

pub fn exit_code_for(error: &ApplicationError) -> u8 {
    match error.kind() {
        ErrorKind::InvalidInput | ErrorKind::TypeMismatch => EXIT_INVALID_INPUT,
        ErrorKind::StorageFailure => EXIT_STORAGE,
        ErrorKind::Internal => EXIT_INTERNAL,
    }
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

pub(crate) fn audit_log(config: &AppConfig) -> FileAuditLog {
    FileAuditLog::new(&config.audit.base_dir)
}

/// Inline text wins, then a file path, then stdin.
pub(crate) fn read_input(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(inline) = inline {
        return Ok(inline);
    }
    if let Some(path) = file {
        return fs::read_to_string(path)
            .with_context(|| format!("could not read input file `{}`", path.display()));
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).context("could not read input from stdin")?;
    Ok(buffer)
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
