//! Gateway factory
//!
//! Builds a gateway from caller configuration:
//! - Merge caller config over factory and builtin defaults
//! - Resolve providers
//! - Check required options
//! - Classify entries into buckets
//! - Assemble the pipeline
//!
//! Each build works on its own mapping and its own filesystem template
//! loader. Only a caller-supplied template engine outlives a build.

use std::sync::Arc;

use paygate_template::FilesystemLoader;

use crate::assembler::assemble;
use crate::classifier::classify;
use crate::config::{
    validate_required_options, BuiltinDefaults, ConfigMap, MergedConfig, Merger, ResolvedConfig,
    Resolver,
};
use crate::error::FactoryResult;
use crate::gateway::{Gateway, Pipeline};

/// Builds gateways from layered configuration
#[derive(Debug, Clone)]
pub struct GatewayFactory {
    defaults: ConfigMap,
    builtin: BuiltinDefaults,
}

impl Default for GatewayFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayFactory {
    pub fn new() -> Self {
        Self::with_defaults(ConfigMap::new())
    }

    /// Factory whose own default layer sits between builtin and caller config
    pub fn with_defaults(defaults: ConfigMap) -> Self {
        Self {
            defaults,
            builtin: BuiltinDefaults::default(),
        }
    }

    /// Replace the builtin defaults
    pub fn with_builtin(mut self, builtin: BuiltinDefaults) -> Self {
        self.builtin = builtin;
        self
    }

    pub fn defaults(&self) -> &ConfigMap {
        &self.defaults
    }

    pub fn builtin(&self) -> &BuiltinDefaults {
        &self.builtin
    }

    /// Merge and resolve `config` without building a gateway
    pub fn create_config(&self, config: ConfigMap) -> FactoryResult<ResolvedConfig> {
        let MergedConfig {
            mut config,
            origins,
        } = Merger::new(&self.builtin, &self.defaults).merge(config);
        tracing::debug!(keys = config.len(), "merged configuration");

        let loader = Arc::new(FilesystemLoader::new());
        Resolver::new(&loader).resolve(&mut config)?;
        validate_required_options(&config)?;

        Ok(ResolvedConfig::new(config, origins))
    }

    /// Build into a fresh pipeline of type `P`.
    ///
    /// Nothing is registered unless resolution and classification succeed.
    pub fn create_with<P: Pipeline + Default>(&self, config: ConfigMap) -> FactoryResult<P> {
        let resolved = self.create_config(config)?;
        let classification = classify(resolved.config())?;

        let mut pipeline = P::default();
        assemble(&mut pipeline, &classification)?;

        tracing::info!(
            handlers = classification.handlers.len(),
            capabilities = classification.capabilities.len(),
            interceptors = classification.interceptors.len(),
            "gateway assembled"
        );
        Ok(pipeline)
    }

    /// Build an in-memory gateway
    pub fn create(&self, config: ConfigMap) -> FactoryResult<Gateway> {
        self.create_with::<Gateway>(config)
    }
}
