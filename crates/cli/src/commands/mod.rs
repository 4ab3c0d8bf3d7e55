pub mod analytics;
pub mod config;
pub mod doctor;
pub mod eligibility;
pub mod feed;
pub mod summary;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shipguard_core::config::{AppConfig, ConfigError, LoadOptions};
use shipguard_core::records::parse_timestamp;
use shipguard_core::{ApplicationError, Clock, FixedClock, PortalEngine, Snapshot, SystemClock};

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
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
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
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Classify an error chain into the structured failure payload.
    pub fn from_error(command: &str, error: &anyhow::Error) -> Self {
        let message = format!("{error:#}");

        if error.downcast_ref::<ConfigError>().is_some() {
            return Self::failure(command, "config_validation", message, 2);
        }
        if let Some(application) = error.downcast_ref::<ApplicationError>() {
            let exit_code = match application {
                ApplicationError::Configuration(_) => 2,
                _ => 3,
            };
            return Self::failure(command, application.error_class(), message, exit_code);
        }

        Self::failure(command, "usage", message, 64)
    }

    /// Human output: plain text unless JSON was requested.
    pub fn render(
        command: &str,
        json: bool,
        message: String,
        lines: Vec<String>,
        data: &impl Serialize,
    ) -> Self {
        if json {
            return Self::success_with_data(command, message, data);
        }

        let mut output = vec![message];
        output.extend(lines);
        Self { exit_code: 0, output: output.join("\n") }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Flags shared by the commands that read a portal snapshot.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub snapshot: Option<PathBuf>,
    pub now: Option<String>,
    pub json: bool,
}

/// Everything a query command needs: validated config, loaded records and an
/// engine pinned to a single instant.
pub(crate) struct Session {
    pub config: AppConfig,
    pub snapshot: Snapshot,
    pub engine: PortalEngine<FixedClock>,
    pub now: DateTime<Utc>,
}

pub(crate) fn open_session(load: LoadOptions, query: &QueryOptions) -> anyhow::Result<Session> {
    let config = AppConfig::load(load)?;

    let path = query
        .snapshot
        .clone()
        .or_else(|| config.snapshot.path.clone())
        .ok_or_else(|| anyhow!("no snapshot given: pass --snapshot or set snapshot.path"))?;
    let snapshot = Snapshot::load(&path)
        .with_context(|| format!("loading snapshot `{}`", path.display()))?;

    let now = match query.now.as_deref() {
        Some(raw) => {
            parse_timestamp(raw).ok_or_else(|| anyhow!("invalid --now value `{raw}`"))?
        }
        None => SystemClock.now(),
    };
    let engine = PortalEngine::with_settings(FixedClock::at(now), config.engine_settings());

    Ok(Session { config, snapshot, engine, now })
}
