//! Lazy value resolution
//!
//! Providers may read sibling keys. The few real cross-dependencies among
//! the defaults are resolved first, in the fixed order of `PRIORITY_KEYS`;
//! every other provider is then resolved in mapping order. A provider that
//! reads a key which is still a provider fails instead of seeing the
//! unresolved value.

use std::sync::Arc;

use paygate_template::FilesystemLoader;

use super::keys;
use super::value::{ConfigMap, ConfigValue, ProviderContext, ProviderError};

/// Keys resolved before everything else, in this order
pub const PRIORITY_KEYS: [&str; 5] = [
    keys::TRANSPORT_CLIENT,
    keys::HTTP_CLIENT,
    keys::TEMPLATE_LOADER,
    keys::PATHS,
    keys::TEMPLATE_ENGINE,
];

/// Resolution errors
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("provider for {key} failed: {source}")]
    Provider {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("provider for {0} returned another provider")]
    ProviderReturnedProvider(String),
}

impl ResolveError {
    /// Key whose provider failed
    pub fn key(&self) -> &str {
        match self {
            ResolveError::Provider { key, .. } => key,
            ResolveError::ProviderReturnedProvider(key) => key,
        }
    }
}

/// Replaces providers with their values, in place
pub struct Resolver<'a> {
    loader: &'a Arc<FilesystemLoader>,
}

impl<'a> Resolver<'a> {
    pub fn new(loader: &'a Arc<FilesystemLoader>) -> Self {
        Self { loader }
    }

    /// Resolve every provider in `config`.
    ///
    /// Each provider runs at most once; resolving an already resolved
    /// mapping does nothing. The first failure aborts resolution.
    pub fn resolve(&self, config: &mut ConfigMap) -> Result<(), ResolveError> {
        for key in PRIORITY_KEYS {
            self.resolve_key(config, key)?;
        }

        let remaining: Vec<String> = config.keys().cloned().collect();
        for key in &remaining {
            self.resolve_key(config, key)?;
        }

        Ok(())
    }

    /// Resolve one key if it holds a provider. Returns whether it did.
    fn resolve_key(&self, config: &mut ConfigMap, key: &str) -> Result<bool, ResolveError> {
        let provider = match config.get(key) {
            Some(ConfigValue::Provider(provider)) => provider.clone(),
            _ => return Ok(false),
        };

        let ctx = ProviderContext::new(key, config, self.loader);
        let value = provider.call(&ctx).map_err(|source| ResolveError::Provider {
            key: key.to_string(),
            source,
        })?;

        if value.is_provider() {
            return Err(ResolveError::ProviderReturnedProvider(key.to_string()));
        }

        tracing::debug!(key, kind = value.type_name(), "resolved provider");
        config.insert(key, value);
        Ok(true)
    }
}
