use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shipguard_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE};
use toml::Value;

struct ConfigField<'a> {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: &'a str,
}

pub fn run(load: LoadOptions) -> String {
    let explicit_path = load.config_path.clone();
    let config = match AppConfig::load(load) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let expiring_soon_days = config.feed.expiring_soon_days.to_string();
    let horizon_days = config.analytics.portfolio_horizon_days.to_string();
    let format = format!("{:?}", config.logging.format).to_ascii_lowercase();
    let snapshot_path = config
        .snapshot
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unset>".to_string());

    let fields = [
        ConfigField {
            key: "logging.level",
            env_keys: &["SHIPGUARD_LOGGING_LEVEL", "SHIPGUARD_LOG_LEVEL"],
            value: &config.logging.level,
        },
        ConfigField {
            key: "logging.format",
            env_keys: &["SHIPGUARD_LOGGING_FORMAT", "SHIPGUARD_LOG_FORMAT"],
            value: &format,
        },
        ConfigField {
            key: "feed.expiring_soon_days",
            env_keys: &["SHIPGUARD_FEED_EXPIRING_SOON_DAYS"],
            value: &expiring_soon_days,
        },
        ConfigField {
            key: "analytics.portfolio_horizon_days",
            env_keys: &["SHIPGUARD_ANALYTICS_PORTFOLIO_HORIZON_DAYS"],
            value: &horizon_days,
        },
        ConfigField {
            key: "snapshot.path",
            env_keys: &["SHIPGUARD_SNAPSHOT_PATH"],
            value: &snapshot_path,
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        render_line(field.key, field.value, source)
    }));

    lines.join("\n")
}

fn detect_config_path(explicit_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path);
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), Path::new("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
