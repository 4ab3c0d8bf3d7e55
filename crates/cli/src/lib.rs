pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use shipguard_core::config::{AppConfig, LoadOptions, LogFormat};

use commands::{CommandResult, QueryOptions};

#[derive(Debug, Parser)]
#[command(
    name = "shipguard",
    about = "Shipguard cargo insurance portal CLI",
    long_about = "Render the customer activity feed, conversion analytics, claim eligibility, and portfolio summary from a portal snapshot.",
    after_help = "Examples:\n  shipguard feed --snapshot portal.json\n  shipguard eligibility --policy-id POL-2026-0007 --json\n  shipguard analytics --now 2026-07-01T00:00:00Z\n  shipguard doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to shipguard.toml (defaults to ./shipguard.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[arg(long, help = "Portal snapshot JSON (falls back to snapshot.path)")]
    snapshot: Option<PathBuf>,
    #[arg(long, help = "Evaluate as of this instant (RFC 3339 or YYYY-MM-DD)")]
    now: Option<String>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    json: bool,
}

impl From<QueryArgs> for QueryOptions {
    fn from(args: QueryArgs) -> Self {
        Self { snapshot: args.snapshot, now: args.now, json: args.json }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Merged quote and policy activity, most recent first")]
    Feed(QueryArgs),
    #[command(about = "Approved, declined, and expired quote counts per reporting window")]
    Analytics(QueryArgs),
    #[command(about = "Check whether a claim can be filed against a policy")]
    Eligibility {
        #[arg(long, help = "Policy id or policy number")]
        policy_id: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    #[command(about = "Active coverage, payment backlog, and policies ending soon")]
    Summary(QueryArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and snapshot readability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let load = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    if let Ok(config) = AppConfig::load(load.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Feed(args) => commands::feed::run(load, &args.into()),
        Command::Analytics(args) => commands::analytics::run(load, &args.into()),
        Command::Eligibility { policy_id, query } => {
            commands::eligibility::run(load, &query.into(), &policy_id)
        }
        Command::Summary(args) => commands::summary::run(load, &args.into()),
        Command::Config => CommandResult { exit_code: 0, output: commands::config::run(load) },
        Command::Doctor { json } => {
            CommandResult { exit_code: 0, output: commands::doctor::run(load, json) }
        }
    };

    tracing::debug!(
        event_name = "cli.command.completed",
        exit_code = result.exit_code,
        "command completed"
    );
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
