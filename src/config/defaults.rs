//! Built-in gateway defaults (lowest layer)
//!
//! Every reserved key gets a value or a provider here. Providers that read
//! other keys only read keys listed before them in `resolve::PRIORITY_KEYS`
//! or plain data.

use std::path::PathBuf;
use std::sync::Arc;

use paygate_template::{LoaderChain, TemplateEngine, TemplateLoader};
use serde_json::{json, Value};

use super::keys;
use super::value::{ConfigMap, ConfigValue, Provider, ProviderError};
use crate::currency::Iso4217;
use crate::handlers::{
    CapturePaymentHandler, EndlessCycleDetector, ExecuteSameRequestWithModelDetailsHandler,
    GetCurrencyHandler, GetHttpRequestHandler, GetTokenHandler, RenderTemplateHandler,
    DEFAULT_CYCLE_LIMIT,
};
use crate::transport::{GatewayHttpClient, ReqwestTransport, TransportSettings};

/// Built-in default configuration values
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    /// Layout template (default: "@GatewayCore/layout.html")
    pub template_layout: String,

    /// Directory of the builtin views, registered as `GatewayCore`
    pub views_dir: PathBuf,

    /// Settings of the default HTTP transport
    pub transport: TransportSettings,

    /// Nesting limit of the endless cycle detector (default: 100)
    pub cycle_limit: usize,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            template_layout: format!("@{}/layout.html", keys::CORE_TEMPLATE_NAMESPACE),
            views_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/views")),
            transport: TransportSettings::default(),
            cycle_limit: DEFAULT_CYCLE_LIMIT,
        }
    }
}

impl BuiltinDefaults {
    /// Default path registry: the builtin views namespace only
    pub fn paths(&self) -> Value {
        let mut paths = serde_json::Map::new();
        paths.insert(
            keys::CORE_TEMPLATE_NAMESPACE.to_string(),
            Value::String(self.views_dir.to_string_lossy().into_owned()),
        );
        Value::Object(paths)
    }

    /// Build a fresh default mapping.
    ///
    /// Components are constructed per call so separate builds never share
    /// builtin instances.
    pub fn to_config(&self) -> ConfigMap {
        let transport = json!({
            "timeout_seconds": self.transport.timeout_seconds,
            "user_agent": self.transport.user_agent,
        });

        ConfigMap::new()
            .with(keys::TEMPLATE_LAYOUT, self.template_layout.as_str())
            .with(keys::TRANSPORT_OPTIONS, transport)
            .with(keys::TRANSPORT_CLIENT, transport_provider())
            .with(keys::HTTP_CLIENT, http_client_provider())
            .with(keys::TEMPLATE_LOADER, loader_provider())
            .with(keys::TEMPLATE_ENGINE, engine_provider(None))
            .with(keys::PATHS, self.paths())
            .with(keys::ISO4217, ConfigValue::Object(Arc::new(Iso4217::default())))
            .with(
                keys::HANDLER_GET_HTTP_REQUEST,
                ConfigValue::Handler(Arc::new(GetHttpRequestHandler)),
            )
            .with(
                keys::HANDLER_CAPTURE_PAYMENT,
                ConfigValue::Handler(Arc::new(CapturePaymentHandler)),
            )
            .with(
                keys::HANDLER_EXECUTE_SAME_REQUEST,
                ConfigValue::Handler(Arc::new(ExecuteSameRequestWithModelDetailsHandler)),
            )
            .with(keys::HANDLER_RENDER_TEMPLATE, render_template_provider())
            .with(
                keys::INTERCEPTOR_ENDLESS_CYCLE_DETECTOR,
                ConfigValue::Interceptor(Arc::new(EndlessCycleDetector::new(self.cycle_limit))),
            )
            .with(keys::HANDLER_GET_CURRENCY, get_currency_provider())
            .with(keys::PREPEND_HANDLERS, json!([]))
            .with(keys::PREPEND_INTERCEPTORS, json!([]))
            .with(keys::PREPEND_CAPABILITIES, json!([]))
            .with(keys::DEFAULT_OPTIONS, json!({}))
            .with(keys::REQUIRED_OPTIONS, json!([]))
            .with(keys::CAPABILITY_HTTP_CLIENT, http_capability_provider())
            .with(keys::TOKEN_STORAGE, Value::Null)
    }
}

/// Builds the default transport from `transport.options`
pub fn transport_provider() -> Provider {
    Provider::new(|ctx| {
        let options = ctx.get_data(keys::TRANSPORT_OPTIONS)?;
        let settings: TransportSettings =
            serde_json::from_value(options.clone()).map_err(|e| {
                ProviderError::Failed(format!("invalid {}: {}", keys::TRANSPORT_OPTIONS, e))
            })?;
        Ok(ConfigValue::HttpClient(Arc::new(ReqwestTransport::new(settings)?)))
    })
}

/// Wraps the resolved transport into the gateway HTTP client
pub fn http_client_provider() -> Provider {
    Provider::new(|ctx| {
        let transport = ctx.get_http_client(keys::TRANSPORT_CLIENT)?;
        Ok(ConfigValue::Capability(Arc::new(GatewayHttpClient::new(transport))))
    })
}

/// Registers every path-registry entry on the build's filesystem loader
pub fn loader_provider() -> Provider {
    Provider::new(|ctx| {
        let paths = ctx.get_data(keys::PATHS)?;
        let entries = paths.as_object().ok_or_else(|| ProviderError::TypeMismatch {
            key: keys::PATHS.to_string(),
            expected: "map",
            found: "data",
        })?;

        for (namespace, path) in entries {
            let path = path.as_str().ok_or_else(|| {
                ProviderError::Failed(format!(
                    "{}.{} must be a filesystem path string",
                    keys::PATHS,
                    namespace
                ))
            })?;
            ctx.loader().add_path(path, namespace);
        }

        let loader: Arc<dyn TemplateLoader> = ctx.loader().clone();
        Ok(ConfigValue::TemplateLoader(loader))
    })
}

/// Template engine provider.
///
/// With a caller engine, its own loaders are chained in front of the resolved
/// `template.loader` and the same engine instance is returned. A gateway
/// loader left on the engine by an earlier build is replaced, not stacked.
/// Otherwise a new engine is built over the resolved loader.
pub fn engine_provider(existing: Option<Arc<TemplateEngine>>) -> Provider {
    Provider::new(move |ctx| {
        let loader = ctx.get_template_loader(keys::TEMPLATE_LOADER)?;
        match &existing {
            Some(engine) => {
                let chain = LoaderChain::with_fallback(engine.loader(), loader);
                engine.set_loader(Arc::new(chain));
                tracing::debug!("chained caller template engine with gateway loader");
                Ok(ConfigValue::TemplateEngine(Arc::clone(engine)))
            }
            None => Ok(ConfigValue::TemplateEngine(Arc::new(TemplateEngine::new(loader)))),
        }
    })
}

pub fn render_template_provider() -> Provider {
    Provider::new(|ctx| {
        let engine = ctx.get_template_engine(keys::TEMPLATE_ENGINE)?;
        let layout = ctx.get_str(keys::TEMPLATE_LAYOUT)?;
        Ok(ConfigValue::Handler(Arc::new(RenderTemplateHandler::new(engine, layout))))
    })
}

pub fn get_currency_provider() -> Provider {
    Provider::new(|ctx| {
        let iso = ctx.get_object::<Iso4217>(keys::ISO4217)?;
        Ok(ConfigValue::Handler(Arc::new(GetCurrencyHandler::new(iso))))
    })
}

pub fn http_capability_provider() -> Provider {
    Provider::new(|ctx| Ok(ConfigValue::Capability(ctx.get_capability(keys::HTTP_CLIENT)?)))
}

/// Registered only when a token store is configured
pub fn get_token_provider() -> Provider {
    Provider::new(|ctx| {
        let store = ctx
            .get_token_store(keys::TOKEN_STORAGE)?
            .ok_or_else(|| ProviderError::Missing(keys::TOKEN_STORAGE.to_string()))?;
        Ok(ConfigValue::Handler(Arc::new(GetTokenHandler::new(store))))
    })
}
