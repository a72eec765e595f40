pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use orderdesk_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "orderdesk",
    about = "Order business-rules engine and decision audit log",
    long_about = "Evaluate orders against the pricing, shipping and review rules, and keep an append-only audit trail of every decision.",
    after_help = "Examples:\n  orderdesk evaluate --input '{\"customer_tier\":\"Gold\",\"order_total\":1450.75}' --log-id ORD-1001\n  orderdesk history --id ORD-1001\n  orderdesk demo"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Evaluate one order and print the decision JSON")]
    Evaluate {
        #[arg(long, help = "Order JSON given inline", conflicts_with = "file")]
        input: Option<String>,
        #[arg(long, help = "Read the order JSON from a file")]
        file: Option<PathBuf>,
        #[arg(long, help = "Also append the decision to this audit log")]
        log_id: Option<String>,
    },
    #[command(about = "Append a payload to an audit log (stdin when --payload is omitted)")]
    Log {
        #[arg(long)]
        id: String,
        #[arg(long)]
        payload: Option<String>,
    },
    #[command(about = "Show the entries recorded in one audit log")]
    History {
        #[arg(long)]
        id: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Dispatch a {\"tool\": .., \"arguments\": ..} request")]
    Call {
        #[arg(long, help = "Request JSON (stdin when omitted)")]
        request: Option<String>,
        #[arg(long, help = "List available tools instead of calling one")]
        list: bool,
    },
    #[command(about = "Evaluate and log the two sample orders")]
    Demo,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter);

    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Entry point for the `orderdesk` binary.
///
/// Logging uses default settings when the config fails to load; the command
/// itself reports the failure.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let logging_config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Evaluate { input, file, log_id } => {
            commands::evaluate::run(commands::evaluate::EvaluateArgs { input, file, log_id })
        }
        Command::Log { id, payload } => commands::log::run(&id, payload),
        Command::History { id, json } => commands::history::run(&id, json),
        Command::Call { list: true, .. } => commands::call::list(),
        Command::Call { request, list: false } => commands::call::run(request),
        Command::Demo => commands::demo::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
