//! Caller configuration from TOML files and `KEY=VALUE` overrides
//!
//! Top-level TOML keys map one-to-one onto configuration keys, so dotted
//! keys must be quoted:
//!
//! ```toml
//! "gateway.template.layout" = "@Shop/layout.html"
//! "gateway.paths" = { Shop = "/srv/shop/views" }
//! ```

use std::fs;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::effective::{ConfigError, ConfigSource};
use super::value::ConfigMap;

/// Load a TOML file as caller data, returning the mapping and its source
pub fn load_config_file(path: &Path) -> Result<(ConfigMap, ConfigSource), ConfigError> {
    let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let table: toml::Table = toml::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    let config = table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect();

    tracing::debug!(path = %path.display(), %digest, "loaded config file");

    Ok((
        config,
        ConfigSource {
            path: path.display().to_string(),
            digest,
        },
    ))
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Parse a `KEY=VALUE` override.
///
/// The value is read as JSON when it parses, otherwise as a plain string,
/// so `sandbox=true` is a boolean and `layout=@Shop/x.html` a string.
pub fn parse_override(raw: &str) -> Result<(String, Value), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
