//! Gateway configuration
//!
//! A build layers three sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Factory defaults
//! 3. Caller config (programmatic, TOML file, or `--set` overrides)
//!
//! Providers left in the merged mapping are then resolved in place.

mod defaults;
mod effective;
mod file;
pub mod keys;
mod merge;
mod resolve;
mod value;

pub use defaults::{
    engine_provider, get_currency_provider, get_token_provider, http_capability_provider,
    http_client_provider, loader_provider, render_template_provider, transport_provider,
    BuiltinDefaults,
};
pub use effective::{
    validate_required_options, ConfigError, ConfigOrigin, ConfigSource, ResolvedConfig, SCHEMA_ID,
};
pub use file::{load_config_file, parse_override};
pub use merge::{overlay_entries, MergedConfig, Merger};
pub use resolve::{ResolveError, Resolver, PRIORITY_KEYS};
pub use value::{ConfigMap, ConfigValue, Provider, ProviderContext, ProviderError};
