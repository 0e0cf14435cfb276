use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

/// Effective configuration with per-key source attribution.
pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let file_path = detect_config_path();
    let file_doc = load_config_file_doc(file_path.as_deref());
    let source = |key: &str, env_keys: &[&str]| {
        field_source(key, env_keys, file_doc.as_ref(), file_path.as_deref())
    };

    let entries = vec![
        ConfigEntry {
            key: "database.url",
            value: redact_url(&config.database.url),
            source: source("database.url", &["ENGAGEFEE_DATABASE_URL"]),
        },
        ConfigEntry {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            source: source("database.max_connections", &["ENGAGEFEE_DATABASE_MAX_CONNECTIONS"]),
        },
        ConfigEntry {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            source: source("database.timeout_secs", &["ENGAGEFEE_DATABASE_TIMEOUT_SECS"]),
        },
        ConfigEntry {
            key: "pricing.default_advance_payment_pct",
            value: config.pricing.default_advance_payment_pct.to_string(),
            source: source(
                "pricing.default_advance_payment_pct",
                &["ENGAGEFEE_PRICING_DEFAULT_ADVANCE_PAYMENT_PCT"],
            ),
        },
        ConfigEntry {
            key: "pricing.default_currency",
            value: config.pricing.default_currency.clone(),
            source: source("pricing.default_currency", &["ENGAGEFEE_PRICING_DEFAULT_CURRENCY"]),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["ENGAGEFEE_LOGGING_LEVEL", "ENGAGEFEE_LOG_LEVEL"]),
        },
        ConfigEntry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source: source(
                "logging.format",
                &["ENGAGEFEE_LOGGING_FORMAT", "ENGAGEFEE_LOG_FORMAT"],
            ),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        entries
            .iter()
            .map(|entry| format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)),
    );
    CommandResult::success_with_data("config", lines.join("\n"), &entries)
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("engagefee.toml"), PathBuf::from("config/engagefee.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if file_doc.is_some_and(|doc| contains_path(doc, key_path)) {
        let file_path = file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
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

/// Hides credentials embedded in a connection URL.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((_, host)) => format!("{scheme}://***@{host}"),
        None => url.to_string(),
    }
}
