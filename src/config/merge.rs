//! Configuration merge logic
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Factory defaults
//! 3. Caller config
//!
//! Merge semantics:
//! - Top-level keys: the highest layer holding a non-null value wins
//! - Path registry: entries are layered over the builtin entry
//! - Caller template engine: handed to the default engine provider for chaining
//! - Default options: fill any key still absent after layering

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::defaults::{engine_provider, get_token_provider, BuiltinDefaults};
use super::effective::ConfigOrigin;
use super::keys;
use super::value::{ConfigMap, ConfigValue};

/// Result of layering: the mapping plus where each key came from
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub config: ConfigMap,
    pub origins: IndexMap<String, ConfigOrigin>,
}

/// Shallow-merge two JSON objects: overlay entries replace base entries.
///
/// - Both objects: union of entries, overlay wins per entry
/// - Overlay null: base is kept
/// - Anything else: overlay wins
pub fn overlay_entries(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                base_map.insert(key, value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Layers caller config over factory defaults and builtin defaults
pub struct Merger<'a> {
    builtin: &'a BuiltinDefaults,
    factory: &'a ConfigMap,
}

impl<'a> Merger<'a> {
    pub fn new(builtin: &'a BuiltinDefaults, factory: &'a ConfigMap) -> Self {
        Self { builtin, factory }
    }

    pub fn merge(&self, caller: ConfigMap) -> MergedConfig {
        let mut origins = IndexMap::new();
        for (key, value) in caller.iter() {
            if !value.is_null() {
                origins.insert(key.clone(), ConfigOrigin::Caller);
            }
        }

        // Caller keys keep their position; lower layers only fill gaps
        let mut config = caller;
        fill_layer(&mut config, &mut origins, self.factory.clone(), ConfigOrigin::Factory);

        // Hold a supplied engine aside so the default provider can extend it
        let existing_engine = match config.get(keys::TEMPLATE_ENGINE) {
            Some(ConfigValue::TemplateEngine(engine)) => Some(Arc::clone(engine)),
            _ => None,
        };
        let engine_origin = origins.get(keys::TEMPLATE_ENGINE).cloned();
        if existing_engine.is_some() {
            config.insert(keys::TEMPLATE_ENGINE, ConfigValue::null());
        }

        let mut builtin = self.builtin.to_config();
        builtin.insert(keys::TEMPLATE_ENGINE, engine_provider(existing_engine));
        fill_layer(&mut config, &mut origins, builtin, ConfigOrigin::Builtin);
        if let Some(origin) = engine_origin {
            origins.insert(keys::TEMPLATE_ENGINE.to_string(), origin);
        }

        if !config.is_absent(keys::TOKEN_STORAGE)
            && config.fill(keys::HANDLER_GET_TOKEN, get_token_provider().into())
        {
            tracing::debug!(key = keys::HANDLER_GET_TOKEN, "token storage configured");
            origins.insert(keys::HANDLER_GET_TOKEN.to_string(), ConfigOrigin::Builtin);
        }

        self.merge_paths(&mut config);
        apply_default_options(&mut config, &mut origins);

        MergedConfig { config, origins }
    }

    /// Layer path-registry entries over the builtin namespace
    fn merge_paths(&self, config: &mut ConfigMap) {
        let Some(ConfigValue::Data(current)) = config.get(keys::PATHS) else {
            return;
        };
        if !current.is_object() {
            return;
        }
        let merged = overlay_entries(self.builtin.paths(), current.clone());
        config.insert(keys::PATHS, merged);
    }
}

fn fill_layer(
    config: &mut ConfigMap,
    origins: &mut IndexMap<String, ConfigOrigin>,
    layer: ConfigMap,
    origin: ConfigOrigin,
) {
    for (key, value) in layer {
        if value.is_null() && config.contains_key(&key) {
            continue;
        }
        if config.fill(&key, value) {
            tracing::trace!(key = %key, ?origin, "filled from defaults");
            origins.insert(key, origin.clone());
        }
    }
}

fn apply_default_options(config: &mut ConfigMap, origins: &mut IndexMap<String, ConfigOrigin>) {
    let options = match config.get(keys::DEFAULT_OPTIONS) {
        Some(ConfigValue::Data(Value::Object(options))) => options.clone(),
        _ => return,
    };

    for (key, value) in options {
        if config.fill(&key, ConfigValue::Data(value)) {
            origins.insert(key, ConfigOrigin::DefaultOptions);
        }
    }
}
