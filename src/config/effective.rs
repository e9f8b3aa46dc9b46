//! Effective configuration with provenance
//!
//! `ResolvedConfig` is what `create_config` hands back: the fully resolved
//! mapping plus where each key came from. It can render a JSON snapshot for
//! inspection, with secret-looking values redacted.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::keys;
use super::value::{ConfigMap, ConfigValue};

/// Schema identifier of the snapshot
pub const SCHEMA_ID: &str = "paygate/effective_config@1";

/// Layer a configuration key came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOrigin {
    Builtin,
    Factory,
    Caller,
    DefaultOptions,
}

/// A contributing config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSource {
    /// File path
    pub path: String,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("invalid override {0:?}: expected KEY=VALUE")]
    InvalidOverride(String),

    #[error("missing required options: {}", .0.join(", "))]
    MissingRequiredOptions(Vec<String>),
}

/// Keys that contain secrets and should be redacted
const SECRET_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "private_key",
    "api_key",
    "credential",
    "signature",
];

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    created_at: DateTime<Utc>,
    config: ConfigMap,
    origins: IndexMap<String, ConfigOrigin>,
    sources: Vec<ConfigSource>,
}

impl ResolvedConfig {
    pub fn new(config: ConfigMap, origins: IndexMap<String, ConfigOrigin>) -> Self {
        Self {
            created_at: Utc::now(),
            config,
            origins,
            sources: Vec::new(),
        }
    }

    /// Record the files the caller layer was loaded from
    pub fn with_sources(mut self, sources: Vec<ConfigSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn into_config(self) -> ConfigMap {
        self.config
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.config.get(key)
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(ConfigValue::as_data)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_data(key).and_then(Value::as_str)
    }

    pub fn origin(&self, key: &str) -> Option<&ConfigOrigin> {
        self.origins.get(key)
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// JSON snapshot of every entry in mapping order
    pub fn snapshot(&self) -> Value {
        let mut redactions = Vec::new();
        let entries: Vec<Value> = self
            .config
            .iter()
            .map(|(key, value)| {
                let mut described = describe(value);
                if matches!(value, ConfigValue::Data(_)) {
                    redact_recursive(&mut described, key.clone(), key, &mut redactions);
                }
                json!({
                    "key": key,
                    "origin": self.origins.get(key),
                    "value": described,
                })
            })
            .collect();

        json!({
            "schema_id": SCHEMA_ID,
            "created_at": self.created_at,
            "sources": self.sources,
            "entries": entries,
            "redactions": redactions,
        })
    }

    /// Serialize the snapshot to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    /// One line per entry: key, origin, value summary
    pub fn to_human(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();
        let width = self.config.keys().map(String::len).max().unwrap_or(0);
        if let Some(entries) = snapshot["entries"].as_array() {
            for entry in entries {
                let key = entry["key"].as_str().unwrap_or_default();
                let origin = entry["origin"].as_str().unwrap_or("-");
                out.push_str(&format!(
                    "{:width$}  {:<15} {}\n",
                    key,
                    origin,
                    entry["value"],
                    width = width
                ));
            }
        }
        out
    }
}

/// JSON description of a resolved value
fn describe(value: &ConfigValue) -> Value {
    match value {
        ConfigValue::Data(v) => v.clone(),
        ConfigValue::Handler(h) => json!({"kind": "handler", "name": h.name()}),
        ConfigValue::Capability(c) => json!({"kind": "capability", "name": c.name()}),
        ConfigValue::Interceptor(i) => json!({"kind": "interceptor", "name": i.name()}),
        other => json!({"kind": other.type_name()}),
    }
}

fn is_secret_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    SECRET_KEYS.iter().any(|s| key_lower.contains(s))
}

fn redact_recursive(value: &mut Value, path: String, key: &str, redactions: &mut Vec<String>) {
    if is_secret_key(key) && !value.is_object() && !value.is_array() && !value.is_null() {
        *value = Value::String("[REDACTED]".to_string());
        redactions.push(path);
        return;
    }

    match value {
        Value::Object(map) => {
            for (child_key, child) in map.iter_mut() {
                let child_path = format!("{}.{}", path, child_key);
                redact_recursive(child, child_path, child_key, redactions);
            }
        }
        Value::Array(arr) => {
            for (i, child) in arr.iter_mut().enumerate() {
                let child_path = format!("{}[{}]", path, i);
                redact_recursive(child, child_path, key, redactions);
            }
        }
        _ => {}
    }
}

/// Check every key listed under `gateway.required_options` is set.
///
/// Null, empty strings, empty lists and empty maps count as unset.
pub fn validate_required_options(config: &ConfigMap) -> Result<(), ConfigError> {
    let required = match config.get(keys::REQUIRED_OPTIONS) {
        Some(ConfigValue::Data(Value::Array(required))) => required,
        _ => return Ok(()),
    };

    let missing: Vec<String> = required
        .iter()
        .filter_map(Value::as_str)
        .filter(|key| match config.get(key) {
            None => true,
            Some(ConfigValue::Data(v)) => is_empty_data(v),
            Some(_) => false,
        })
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingRequiredOptions(missing))
    }
}

fn is_empty_data(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
