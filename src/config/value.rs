//! Configuration values and providers
//!
//! A `ConfigMap` is an insertion-ordered mapping from key to `ConfigValue`.
//! Values are plain data, concrete components, or `Provider`s that compute
//! the real value from the rest of the mapping during resolution.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use paygate_template::{FilesystemLoader, TemplateEngine, TemplateLoader};
use serde_json::Value;

use crate::gateway::{Capability, Handler, Interceptor};
use crate::security::TokenStore;
use crate::transport::{HttpClient, TransportError};

/// Errors raised by providers
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("missing configuration key: {0}")]
    Missing(String),

    #[error("configuration key {0} was read before it was resolved")]
    UnresolvedDependency(String),

    #[error("configuration key {key} holds {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Failed(String),
}

type ProviderFn = dyn Fn(&ProviderContext<'_>) -> Result<ConfigValue, ProviderError> + Send + Sync;

/// Deferred configuration value, evaluated once during resolution
#[derive(Clone)]
pub struct Provider(Arc<ProviderFn>);

impl Provider {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ProviderContext<'_>) -> Result<ConfigValue, ProviderError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &ProviderContext<'_>) -> Result<ConfigValue, ProviderError> {
        (self.0)(ctx)
    }

    pub fn ptr_eq(&self, other: &Provider) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Provider(..)")
    }
}

/// A configuration value
#[derive(Clone, Debug)]
pub enum ConfigValue {
    /// Scalars, lists and nested maps
    Data(Value),
    Handler(Arc<dyn Handler>),
    Capability(Arc<dyn Capability>),
    Interceptor(Arc<dyn Interceptor>),
    HttpClient(Arc<dyn HttpClient>),
    TemplateLoader(Arc<dyn TemplateLoader>),
    TemplateEngine(Arc<TemplateEngine>),
    TokenStore(Arc<dyn TokenStore>),
    /// Extension objects, read back with `ProviderContext::get_object`
    Object(Arc<dyn Any + Send + Sync>),
    Provider(Provider),
}

impl ConfigValue {
    pub fn null() -> Self {
        ConfigValue::Data(Value::Null)
    }

    pub fn provider<F>(f: F) -> Self
    where
        F: Fn(&ProviderContext<'_>) -> Result<ConfigValue, ProviderError> + Send + Sync + 'static,
    {
        ConfigValue::Provider(Provider::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Data(Value::Null))
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, ConfigValue::Provider(_))
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            ConfigValue::Data(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the variant, used in errors and snapshots
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Data(Value::Null) => "null",
            ConfigValue::Data(_) => "data",
            ConfigValue::Handler(_) => "handler",
            ConfigValue::Capability(_) => "capability",
            ConfigValue::Interceptor(_) => "interceptor",
            ConfigValue::HttpClient(_) => "http_client",
            ConfigValue::TemplateLoader(_) => "template_loader",
            ConfigValue::TemplateEngine(_) => "template_engine",
            ConfigValue::TokenStore(_) => "token_store",
            ConfigValue::Object(_) => "object",
            ConfigValue::Provider(_) => "provider",
        }
    }
}

/// Data compares by value, everything else by identity
impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        use ConfigValue::*;
        match (self, other) {
            (Data(a), Data(b)) => a == b,
            (Handler(a), Handler(b)) => Arc::ptr_eq(a, b),
            (Capability(a), Capability(b)) => Arc::ptr_eq(a, b),
            (Interceptor(a), Interceptor(b)) => Arc::ptr_eq(a, b),
            (HttpClient(a), HttpClient(b)) => Arc::ptr_eq(a, b),
            (TemplateLoader(a), TemplateLoader(b)) => Arc::ptr_eq(a, b),
            (TemplateEngine(a), TemplateEngine(b)) => Arc::ptr_eq(a, b),
            (TokenStore(a), TokenStore(b)) => Arc::ptr_eq(a, b),
            (Object(a), Object(b)) => Arc::ptr_eq(a, b),
            (Provider(a), Provider(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        ConfigValue::Data(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Data(Value::String(value.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Data(Value::String(value))
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Data(Value::Bool(value))
    }
}

impl From<Provider> for ConfigValue {
    fn from(value: Provider) -> Self {
        ConfigValue::Provider(value)
    }
}

impl From<Arc<TemplateEngine>> for ConfigValue {
    fn from(value: Arc<TemplateEngine>) -> Self {
        ConfigValue::TemplateEngine(value)
    }
}

/// Insertion-ordered configuration mapping
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigMap {
    entries: IndexMap<String, ConfigValue>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace; a replaced key keeps its position
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Missing keys and null values both count as absent
    pub fn is_absent(&self, key: &str) -> bool {
        self.get(key).map_or(true, ConfigValue::is_null)
    }

    /// Set `key` only if it is absent. Returns true if the value was stored.
    pub fn fill(&mut self, key: &str, value: ConfigValue) -> bool {
        if !self.is_absent(key) {
            return false;
        }
        self.insert(key, value);
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys whose value is still a provider
    pub fn unresolved_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_provider())
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for ConfigMap {
    type Item = (String, ConfigValue);
    type IntoIter = indexmap::map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// What a provider sees while it runs.
///
/// Reads go through typed accessors that refuse values which are still
/// providers, so a provider can only depend on keys resolved before it.
pub struct ProviderContext<'a> {
    key: &'a str,
    config: &'a ConfigMap,
    loader: &'a Arc<FilesystemLoader>,
}

impl<'a> ProviderContext<'a> {
    pub fn new(key: &'a str, config: &'a ConfigMap, loader: &'a Arc<FilesystemLoader>) -> Self {
        Self {
            key,
            config,
            loader,
        }
    }

    /// Key being resolved
    pub fn key(&self) -> &str {
        self.key
    }

    /// Filesystem loader owned by the current build
    pub fn loader(&self) -> &Arc<FilesystemLoader> {
        self.loader
    }

    /// Resolved value of `key`
    pub fn get(&self, key: &str) -> Result<&ConfigValue, ProviderError> {
        match self.config.get(key) {
            None => Err(ProviderError::Missing(key.to_string())),
            Some(ConfigValue::Provider(_)) => {
                Err(ProviderError::UnresolvedDependency(key.to_string()))
            }
            Some(value) => Ok(value),
        }
    }

    pub fn get_data(&self, key: &str) -> Result<&Value, ProviderError> {
        match self.get(key)? {
            ConfigValue::Data(v) => Ok(v),
            other => Err(mismatch(key, "data", other)),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str, ProviderError> {
        match self.get(key)? {
            ConfigValue::Data(Value::String(s)) => Ok(s.as_str()),
            other => Err(mismatch(key, "string", other)),
        }
    }

    pub fn get_http_client(&self, key: &str) -> Result<Arc<dyn HttpClient>, ProviderError> {
        match self.get(key)? {
            ConfigValue::HttpClient(c) => Ok(Arc::clone(c)),
            other => Err(mismatch(key, "http_client", other)),
        }
    }

    pub fn get_capability(&self, key: &str) -> Result<Arc<dyn Capability>, ProviderError> {
        match self.get(key)? {
            ConfigValue::Capability(c) => Ok(Arc::clone(c)),
            other => Err(mismatch(key, "capability", other)),
        }
    }

    pub fn get_template_loader(
        &self,
        key: &str,
    ) -> Result<Arc<dyn TemplateLoader>, ProviderError> {
        match self.get(key)? {
            ConfigValue::TemplateLoader(l) => Ok(Arc::clone(l)),
            other => Err(mismatch(key, "template_loader", other)),
        }
    }

    pub fn get_template_engine(&self, key: &str) -> Result<Arc<TemplateEngine>, ProviderError> {
        match self.get(key)? {
            ConfigValue::TemplateEngine(e) => Ok(Arc::clone(e)),
            other => Err(mismatch(key, "template_engine", other)),
        }
    }

    /// Token store under `key`; null means none is configured
    pub fn get_token_store(
        &self,
        key: &str,
    ) -> Result<Option<Arc<dyn TokenStore>>, ProviderError> {
        match self.get(key)? {
            ConfigValue::TokenStore(s) => Ok(Some(Arc::clone(s))),
            ConfigValue::Data(Value::Null) => Ok(None),
            other => Err(mismatch(key, "token_store", other)),
        }
    }

    /// Extension object of concrete type `T`
    pub fn get_object<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ProviderError> {
        match self.get(key)? {
            ConfigValue::Object(o) => Arc::clone(o).downcast::<T>().map_err(|_| {
                ProviderError::TypeMismatch {
                    key: key.to_string(),
                    expected: std::any::type_name::<T>(),
                    found: "object",
                }
            }),
            other => Err(mismatch(key, "object", other)),
        }
    }
}

fn mismatch(key: &str, expected: &'static str, found: &ConfigValue) -> ProviderError {
    ProviderError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}
