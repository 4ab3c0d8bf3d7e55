use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{EngineSettings, DEFAULT_PORTFOLIO_HORIZON_DAYS};
use crate::feed::{FeedSettings, DEFAULT_EXPIRING_SOON_DAYS};

pub const DEFAULT_CONFIG_FILE: &str = "shipguard.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub feed: FeedConfig,
    pub analytics: AnalyticsConfig,
    pub snapshot: SnapshotConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeedConfig {
    pub expiring_soon_days: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalyticsConfig {
    pub portfolio_horizon_days: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub expiring_soon_days: Option<i64>,
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            feed: FeedConfig { expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS },
            analytics: AnalyticsConfig { portfolio_horizon_days: DEFAULT_PORTFOLIO_HORIZON_DAYS },
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            feed: FeedSettings { expiring_soon_days: self.feed.expiring_soon_days },
            portfolio_horizon_days: self.analytics.portfolio_horizon_days,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(expiring_soon_days) = patch.feed.and_then(|feed| feed.expiring_soon_days) {
            self.feed.expiring_soon_days = expiring_soon_days;
        }

        if let Some(horizon) = patch.analytics.and_then(|analytics| analytics.portfolio_horizon_days)
        {
            self.analytics.portfolio_horizon_days = horizon;
        }

        if let Some(path) = patch.snapshot.and_then(|snapshot| snapshot.path) {
            self.snapshot.path = Some(path);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let log_level =
            read_env("SHIPGUARD_LOGGING_LEVEL").or_else(|| read_env("SHIPGUARD_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHIPGUARD_LOGGING_FORMAT").or_else(|| read_env("SHIPGUARD_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("SHIPGUARD_FEED_EXPIRING_SOON_DAYS") {
            self.feed.expiring_soon_days = parse_i64("SHIPGUARD_FEED_EXPIRING_SOON_DAYS", &value)?;
        }
        if let Some(value) = read_env("SHIPGUARD_ANALYTICS_PORTFOLIO_HORIZON_DAYS") {
            self.analytics.portfolio_horizon_days =
                parse_i64("SHIPGUARD_ANALYTICS_PORTFOLIO_HORIZON_DAYS", &value)?;
        }
        if let Some(value) = read_env("SHIPGUARD_SNAPSHOT_PATH") {
            self.snapshot.path = Some(PathBuf::from(value));
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(expiring_soon_days) = overrides.expiring_soon_days {
            self.feed.expiring_soon_days = expiring_soon_days;
        }
        if let Some(snapshot_path) = overrides.snapshot_path {
            self.snapshot.path = Some(snapshot_path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_logging(&self.logging)?;

        if !(0..=365).contains(&self.feed.expiring_soon_days) {
            return Err(ConfigError::Validation(
                "feed.expiring_soon_days must be in range 0..=365".to_string(),
            ));
        }

        if !(1..=365).contains(&self.analytics.portfolio_horizon_days) {
            return Err(ConfigError::Validation(
                "analytics.portfolio_horizon_days must be in range 1..=365".to_string(),
            ));
        }

        if self.snapshot.path.as_ref().is_some_and(|path| path.as_os_str().is_empty()) {
            return Err(ConfigError::Validation(
                "snapshot.path must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), Path::new("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    logging: Option<LoggingPatch>,
    feed: Option<FeedPatch>,
    analytics: Option<AnalyticsPatch>,
    snapshot: Option<SnapshotPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedPatch {
    expiring_soon_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsPatch {
    portfolio_horizon_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotPatch {
    path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const VARS: &[&str] = &[
        "SHIPGUARD_LOGGING_LEVEL",
        "SHIPGUARD_LOG_LEVEL",
        "SHIPGUARD_LOGGING_FORMAT",
        "SHIPGUARD_LOG_FORMAT",
        "SHIPGUARD_FEED_EXPIRING_SOON_DAYS",
        "SHIPGUARD_ANALYTICS_PORTFOLIO_HORIZON_DAYS",
        "SHIPGUARD_SNAPSHOT_PATH",
        "TEST_SHIPGUARD_SNAPSHOT_DIR",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> Result<PathBuf, String> {
        let path = dir.path().join("shipguard.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let config = AppConfig::default();
        config.validate().map_err(|err| err.to_string())?;

        ensure(config.logging.format == LogFormat::Compact, "default format should be compact")?;
        ensure(config.feed.expiring_soon_days == 7, "default expiring window is seven days")?;
        ensure(config.snapshot.path.is_none(), "no snapshot path by default")?;
        let settings = config.engine_settings();
        ensure(
            settings.portfolio_horizon_days == config.analytics.portfolio_horizon_days,
            "engine settings should mirror analytics horizon",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("TEST_SHIPGUARD_SNAPSHOT_DIR", "/var/lib/shipguard");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[snapshot]
path = "${TEST_SHIPGUARD_SNAPSHOT_DIR}/portal.json"

[feed]
expiring_soon_days = 3
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.snapshot.path == Some(PathBuf::from("/var/lib/shipguard/portal.json")),
                "snapshot path should be interpolated from environment",
            )?;
            ensure(config.feed.expiring_soon_days == 3, "feed window should come from file")
        })();

        clear_vars();
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[snapshot]\npath = \"${TEST_SHIPGUARD_SNAPSHOT_DIR}\"\n")?;

        let error = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            .err()
            .ok_or_else(|| "expected interpolation failure".to_string())?;
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_SHIPGUARD_SNAPSHOT_DIR"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("SHIPGUARD_LOG_LEVEL", "warn");
        env::set_var("SHIPGUARD_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(config.logging.format == LogFormat::Json, "json format should be set from env var")
        })();

        clear_vars();
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("SHIPGUARD_FEED_EXPIRING_SOON_DAYS", "10");
        env::set_var("SHIPGUARD_ANALYTICS_PORTFOLIO_HORIZON_DAYS", "45");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[logging]
level = "warn"

[feed]
expiring_soon_days = 5

[analytics]
portfolio_horizon_days = 60

[snapshot]
path = "from-file.json"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    expiring_soon_days: Some(2),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "debug", "override log level should win")?;
            ensure(config.feed.expiring_soon_days == 2, "override feed window should win")?;
            ensure(
                config.analytics.portfolio_horizon_days == 45,
                "env horizon should win over file",
            )?;
            ensure(
                config.snapshot.path == Some(PathBuf::from("from-file.json")),
                "file snapshot path should win over defaults",
            )
        })();

        clear_vars();
        result
    }

    #[test]
    fn invalid_env_override_names_the_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("SHIPGUARD_FEED_EXPIRING_SOON_DAYS", "soon");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid override error".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "SHIPGUARD_FEED_EXPIRING_SOON_DAYS"),
                "error should name the env key",
            ),
        };

        clear_vars();
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("SHIPGUARD_ANALYTICS_PORTFOLIO_HORIZON_DAYS", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("analytics.portfolio_horizon_days")
            );
            ensure(has_message, "validation failure should mention the horizon key")
        })();

        clear_vars();
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        })
        .err()
        .ok_or_else(|| "expected missing file error".to_string())?;

        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref path) if path == &missing),
            "error should carry the expected path",
        )
    }

    #[test]
    fn unknown_sections_are_rejected() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[database]\nurl = \"sqlite://x.db\"\n")?;

        let error = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            .err()
            .ok_or_else(|| "expected parse failure".to_string())?;
        ensure(matches!(error, ConfigError::ParseFile { .. }), "unknown section should fail parse")
    }
}
