//! Gateway factory integration tests
//!
//! Each section covers one observable property of a build: defaults,
//! precedence, resolution, template wiring, classification, placement,
//! token handling and failure behavior.

use std::any::Any;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use paygate::config::{keys, ConfigError, ConfigOrigin, ResolveError, Resolver, PRIORITY_KEYS};
use paygate::handlers::{GetTokenHandler, RenderTemplateHandler};
use paygate::security::{InMemoryTokenStore, Token, TokenStore};
use paygate::transport::{GatewayHttpClient, HttpClient, HttpRequest, HttpResponse, TransportError};
use paygate::{
    Capability, ConfigMap, ConfigValue, EntryKind, FactoryError, Gateway, GatewayFactory, Handler,
    Interceptor, Pipeline, PipelineError, ProviderError,
};
use paygate_template::{FilesystemLoader, TemplateEngine, TemplateLoader};
use serde_json::json;
use tempfile::TempDir;

#[derive(Debug)]
struct Audit(&'static str);

impl Handler for Audit {
    fn name(&self) -> &str {
        self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Capability for Audit {
    fn name(&self) -> &str {
        self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Interceptor for Audit {
    fn name(&self) -> &str {
        self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn handler(name: &'static str) -> ConfigValue {
    ConfigValue::Handler(Arc::new(Audit(name)))
}

#[derive(Debug)]
struct StaticTransport;

impl HttpClient for StaticTransport {
    fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 204,
            ..Default::default()
        })
    }
}

fn views_dir(file: &str, contents: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(file), contents).unwrap();
    dir
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_default_config_is_complete_and_resolved() {
    let resolved = GatewayFactory::new().create_config(ConfigMap::new()).unwrap();

    for key in [
        keys::TEMPLATE_LAYOUT,
        keys::TRANSPORT_CLIENT,
        keys::TRANSPORT_OPTIONS,
        keys::HTTP_CLIENT,
        keys::TEMPLATE_LOADER,
        keys::TEMPLATE_ENGINE,
        keys::PATHS,
        keys::ISO4217,
        keys::HANDLER_GET_HTTP_REQUEST,
        keys::HANDLER_CAPTURE_PAYMENT,
        keys::HANDLER_EXECUTE_SAME_REQUEST,
        keys::HANDLER_RENDER_TEMPLATE,
        keys::HANDLER_GET_CURRENCY,
        keys::INTERCEPTOR_ENDLESS_CYCLE_DETECTOR,
        keys::CAPABILITY_HTTP_CLIENT,
        keys::PREPEND_HANDLERS,
        keys::PREPEND_CAPABILITIES,
        keys::PREPEND_INTERCEPTORS,
        keys::DEFAULT_OPTIONS,
        keys::REQUIRED_OPTIONS,
        keys::TOKEN_STORAGE,
    ] {
        let value = resolved.get(key).unwrap_or_else(|| panic!("missing {}", key));
        assert!(!value.is_provider(), "{} left unresolved", key);
        assert_eq!(resolved.origin(key), Some(&ConfigOrigin::Builtin));
    }
    assert!(resolved.get(keys::HANDLER_GET_TOKEN).is_none());
    assert!(resolved.config().unresolved_keys().is_empty());
}

#[test]
fn test_http_capability_is_the_gateway_client() {
    let resolved = GatewayFactory::new().create_config(ConfigMap::new()).unwrap();

    assert_eq!(
        resolved.get(keys::CAPABILITY_HTTP_CLIENT),
        resolved.get(keys::HTTP_CLIENT)
    );
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn test_caller_value_wins() {
    let resolved = GatewayFactory::new()
        .create_config(ConfigMap::new().with(keys::TEMPLATE_LAYOUT, "@Shop/layout.html"))
        .unwrap();

    assert_eq!(resolved.get_str(keys::TEMPLATE_LAYOUT), Some("@Shop/layout.html"));
    assert_eq!(resolved.origin(keys::TEMPLATE_LAYOUT), Some(&ConfigOrigin::Caller));
}

#[test]
fn test_caller_provider_is_invoked_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = ConfigMap::new().with(
        "shop.greeting",
        ConfigValue::provider(move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ConfigValue::from(format!("layout is {}", ctx.get_str(keys::TEMPLATE_LAYOUT)?)))
        }),
    );

    let resolved = GatewayFactory::new().create_config(config).unwrap();

    assert_eq!(
        resolved.get_str("shop.greeting"),
        Some("layout is @GatewayCore/layout.html")
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_caller_transport_feeds_http_client() {
    let transport: Arc<dyn HttpClient> = Arc::new(StaticTransport);
    let config = ConfigMap::new().with(keys::TRANSPORT_CLIENT, ConfigValue::HttpClient(transport));

    let gateway = GatewayFactory::new().create(config).unwrap();
    let client = gateway.capability::<GatewayHttpClient>().unwrap();
    let response = client.send(HttpRequest::new("GET", "https://example.test")).unwrap();

    assert_eq!(response.status, 204);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_resolution_is_idempotent() {
    let factory = GatewayFactory::new();
    let resolved = factory.create_config(ConfigMap::new()).unwrap();
    let mut config = resolved.config().clone();

    Resolver::new(&Arc::new(FilesystemLoader::new()))
        .resolve(&mut config)
        .unwrap();

    assert_eq!(&config, resolved.config());
}

#[test]
fn test_priority_keys_order() {
    assert_eq!(
        PRIORITY_KEYS,
        [
            "transport.client",
            "gateway.http_client",
            "template.loader",
            "gateway.paths",
            "template.engine",
        ]
    );
}

#[test]
fn test_caller_paths_provider_is_unresolved_for_loader() {
    // The loader resolves before the path registry
    let config = ConfigMap::new().with(
        keys::PATHS,
        ConfigValue::provider(|_| Ok(ConfigValue::from(json!({"Shop": "/srv"})))),
    );

    match GatewayFactory::new().create_config(config) {
        Err(FactoryError::Resolve(ResolveError::Provider { key, source })) => {
            assert_eq!(key, keys::TEMPLATE_LOADER);
            assert!(matches!(
                source,
                ProviderError::UnresolvedDependency(dep) if dep == keys::PATHS
            ));
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

// =============================================================================
// Templates
// =============================================================================

#[test]
fn test_paths_are_additive() {
    let shop = views_dir("receipt.html", "receipt");
    let factory = GatewayFactory::new();
    let config = ConfigMap::new().with(
        keys::PATHS,
        json!({"Shop": shop.path().to_string_lossy()}),
    );

    let resolved = factory.create_config(config).unwrap();
    let paths = resolved.get_data(keys::PATHS).unwrap();

    assert!(paths[keys::CORE_TEMPLATE_NAMESPACE].is_string());
    assert!(paths["Shop"].is_string());
    let loader = match resolved.get(keys::TEMPLATE_LOADER) {
        Some(ConfigValue::TemplateLoader(loader)) => Arc::clone(loader),
        other => panic!("unexpected template loader: {:?}", other),
    };
    assert!(loader.exists("@Shop/receipt.html"));
    assert!(loader.exists("@GatewayCore/layout.html"));
}

#[test]
fn test_caller_engine_is_chained() {
    let shop = views_dir("layout.html", "<shop>{{ content }}</shop>");
    let own_loader = Arc::new(FilesystemLoader::new());
    own_loader.add_path(shop.path(), "Shop");
    let engine = Arc::new(TemplateEngine::new(own_loader));

    let factory = GatewayFactory::new();
    let config = ConfigMap::new()
        .with(keys::TEMPLATE_ENGINE, Arc::clone(&engine))
        .with(keys::TEMPLATE_LAYOUT, "@Shop/layout.html");
    let resolved = factory.create_config(config).unwrap();

    assert_eq!(
        resolved.get(keys::TEMPLATE_ENGINE),
        Some(&ConfigValue::from(Arc::clone(&engine)))
    );
    assert_eq!(resolved.origin(keys::TEMPLATE_ENGINE), Some(&ConfigOrigin::Caller));
    assert!(format!("{:?}", engine.loader()).starts_with("LoaderChain"));
    assert!(engine.exists("@Shop/layout.html"));
    assert!(engine.exists("@GatewayCore/layout.html"));
}

#[test]
fn test_caller_engine_chain_stays_flat_across_builds() {
    let shop = views_dir("layout.html", "<shop/>");
    let own_loader = Arc::new(FilesystemLoader::new());
    own_loader.add_path(shop.path(), "Shop");
    let engine = Arc::new(TemplateEngine::new(own_loader));
    let extra = views_dir("extra.html", "extra");

    let factory = GatewayFactory::new();
    for _ in 0..5 {
        factory
            .create_config(ConfigMap::new().with(keys::TEMPLATE_ENGINE, Arc::clone(&engine)))
            .unwrap();
    }
    factory
        .create_config(
            ConfigMap::new()
                .with(keys::TEMPLATE_ENGINE, Arc::clone(&engine))
                .with(keys::PATHS, json!({"Extra": extra.path().to_string_lossy()})),
        )
        .unwrap();

    let loader = engine.loader();
    let chain = loader.as_chain().expect("engine loader should be a chain");
    assert_eq!(chain.loaders().len(), 1);
    assert!(chain.loaders().iter().all(|l| l.as_chain().is_none()));
    assert!(chain.fallback().is_some_and(|l| l.as_chain().is_none()));
    assert!(engine.exists("@Shop/layout.html"));
    assert!(engine.exists("@Extra/extra.html"));

    factory
        .create_config(ConfigMap::new().with(keys::TEMPLATE_ENGINE, Arc::clone(&engine)))
        .unwrap();
    assert!(!engine.exists("@Extra/extra.html"));
    assert!(engine.exists("@GatewayCore/layout.html"));
}

#[test]
fn test_render_handler_uses_caller_engine() {
    let shop = views_dir("layout.html", "<shop/>");
    let own_loader = Arc::new(FilesystemLoader::new());
    own_loader.add_path(shop.path(), "Shop");
    let engine = Arc::new(TemplateEngine::new(own_loader));

    let gateway = GatewayFactory::new()
        .create(
            ConfigMap::new()
                .with(keys::TEMPLATE_ENGINE, Arc::clone(&engine))
                .with(keys::TEMPLATE_LAYOUT, "@Shop/layout.html"),
        )
        .unwrap();
    let render = gateway.handler::<RenderTemplateHandler>().unwrap();

    assert!(Arc::ptr_eq(render.engine(), &engine));
    assert_eq!(render.layout_source().unwrap(), "<shop/>");
}

#[test]
fn test_default_engine_renders_builtin_layout() {
    let gateway = GatewayFactory::new().create(ConfigMap::new()).unwrap();
    let render = gateway.handler::<RenderTemplateHandler>().unwrap();

    assert_eq!(render.layout(), "@GatewayCore/layout.html");
    assert!(render.layout_source().unwrap().contains("<html"));
}

// =============================================================================
// Classification and placement
// =============================================================================

#[test]
fn test_custom_entries_land_in_their_buckets() {
    let config = ConfigMap::new()
        .with("gateway.handler.audit", handler("audit"))
        .with("gateway.capability.ledger", ConfigValue::Capability(Arc::new(Audit("ledger"))))
        .with("gateway.interceptor.trace", ConfigValue::Interceptor(Arc::new(Audit("trace"))))
        .with("shop.handler.not_registered", handler("ignored"));

    let shape = GatewayFactory::new().create(config).unwrap().shape();

    assert_eq!(shape.handlers.first().map(String::as_str), Some("audit"));
    assert_eq!(shape.handlers.len(), 6);
    assert!(!shape.handlers.contains(&"ignored".to_string()));
    assert_eq!(shape.capabilities, vec!["ledger", "http_client"]);
    assert_eq!(shape.interceptors, vec!["trace", "endless_cycle_detector"]);
}

#[test]
fn test_prepended_entry_goes_first() {
    let factory = GatewayFactory::with_defaults(
        ConfigMap::new().with("gateway.handler.a", handler("a")),
    );
    let config = ConfigMap::new()
        .with("gateway.handler.b", handler("b"))
        .with(keys::PREPEND_HANDLERS, json!(["gateway.handler.capture_payment"]));

    let shape = factory.create(config).unwrap().shape();

    assert_eq!(shape.handlers[0], "capture_payment");
    assert_eq!(shape.handlers[1], "b");
    assert_eq!(shape.handlers[2], "a");
}

#[test]
fn test_multiple_prepends_keep_declared_order() {
    let config = ConfigMap::new()
        .with("gateway.interceptor.first", ConfigValue::Interceptor(Arc::new(Audit("first"))))
        .with(
            keys::PREPEND_INTERCEPTORS,
            json!([
                "gateway.interceptor.endless_cycle_detector",
                "gateway.interceptor.first",
                "gateway.interceptor.unknown"
            ]),
        );

    let shape = GatewayFactory::new().create(config).unwrap().shape();

    assert_eq!(shape.interceptors, vec!["endless_cycle_detector", "first"]);
}

#[test]
fn test_kind_mismatch_is_rejected() {
    let config = ConfigMap::new().with("gateway.capability.audit", handler("audit"));

    match GatewayFactory::new().create(config) {
        Err(FactoryError::Classify(err)) => {
            assert!(err.to_string().contains("gateway.capability.audit"));
        }
        other => panic!("unexpected result: {:?}", other.map(|g| g.shape())),
    }
}

// =============================================================================
// Token storage
// =============================================================================

#[test]
fn test_get_token_registered_with_storage() {
    let store = Arc::new(InMemoryTokenStore::new());
    store.insert(Token {
        hash: "abc".to_string(),
        gateway_name: "paypal".to_string(),
        target_url: "https://shop.test/capture".to_string(),
        after_url: None,
        details: json!({}),
    });
    let shared: Arc<dyn TokenStore> = store;

    let gateway = GatewayFactory::new()
        .create(ConfigMap::new().with(keys::TOKEN_STORAGE, ConfigValue::TokenStore(shared)))
        .unwrap();

    let handler = gateway.handler::<GetTokenHandler>().unwrap();
    assert_eq!(handler.fetch("abc").unwrap().gateway_name, "paypal");
    assert!(gateway.shape().handlers.contains(&"get_token".to_string()));
}

#[test]
fn test_no_get_token_without_storage() {
    let gateway = GatewayFactory::new().create(ConfigMap::new()).unwrap();

    assert!(gateway.handler::<GetTokenHandler>().is_none());
}

#[test]
fn test_caller_get_token_handler_kept() {
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let config = ConfigMap::new()
        .with(keys::HANDLER_GET_TOKEN, handler("custom_get_token"))
        .with(keys::TOKEN_STORAGE, ConfigValue::TokenStore(store));

    let shape = GatewayFactory::new().create(config).unwrap().shape();

    assert_eq!(shape.handlers[0], "custom_get_token");
    assert!(!shape.handlers.contains(&"get_token".to_string()));
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_default_options_fill_gaps() {
    let config = ConfigMap::new()
        .with("username", "merchant")
        .with(keys::DEFAULT_OPTIONS, json!({"username": "", "sandbox": true}));

    let resolved = GatewayFactory::new().create_config(config).unwrap();

    assert_eq!(resolved.get_str("username"), Some("merchant"));
    assert_eq!(resolved.get_data("sandbox"), Some(&json!(true)));
    assert_eq!(resolved.origin("sandbox"), Some(&ConfigOrigin::DefaultOptions));
}

#[test]
fn test_required_options_enforced() {
    let factory = GatewayFactory::with_defaults(
        ConfigMap::new().with(keys::REQUIRED_OPTIONS, json!(["username", "password"])),
    );

    match factory.create_config(ConfigMap::new().with("username", "merchant")) {
        Err(FactoryError::Config(ConfigError::MissingRequiredOptions(missing))) => {
            assert_eq!(missing, vec!["password"]);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    let ok = factory.create_config(
        ConfigMap::new()
            .with("username", "merchant")
            .with("password", "hunter2"),
    );
    assert!(ok.is_ok());
}

// =============================================================================
// Failures
// =============================================================================

/// Fails the test if anything is registered
#[derive(Default)]
struct UntouchedPipeline;

impl Pipeline for UntouchedPipeline {
    fn add_handler(&mut self, handler: Arc<dyn Handler>, _: bool) -> Result<(), PipelineError> {
        panic!("handler {} registered", handler.name());
    }

    fn add_capability(
        &mut self,
        capability: Arc<dyn Capability>,
        _: bool,
    ) -> Result<(), PipelineError> {
        panic!("capability {} registered", capability.name());
    }

    fn add_interceptor(
        &mut self,
        interceptor: Arc<dyn Interceptor>,
        _: bool,
    ) -> Result<(), PipelineError> {
        panic!("interceptor {} registered", interceptor.name());
    }
}

#[test]
fn test_provider_failure_aborts_build() {
    let config = ConfigMap::new().with(
        "gateway.handler.broken",
        ConfigValue::provider(|_| Err(ProviderError::Failed("credentials rejected".to_string()))),
    );

    match GatewayFactory::new().create_with::<UntouchedPipeline>(config) {
        Err(FactoryError::Resolve(ResolveError::Provider { key, source })) => {
            assert_eq!(key, "gateway.handler.broken");
            assert_eq!(source.to_string(), "credentials rejected");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("build should fail"),
    }
}

/// Accepts everything except interceptors
#[derive(Default)]
struct NoInterceptors {
    inner: Gateway,
}

impl Pipeline for NoInterceptors {
    fn add_handler(
        &mut self,
        handler: Arc<dyn Handler>,
        prepend: bool,
    ) -> Result<(), PipelineError> {
        self.inner.add_handler(handler, prepend)
    }

    fn add_capability(
        &mut self,
        capability: Arc<dyn Capability>,
        prepend: bool,
    ) -> Result<(), PipelineError> {
        self.inner.add_capability(capability, prepend)
    }

    fn add_interceptor(
        &mut self,
        interceptor: Arc<dyn Interceptor>,
        _: bool,
    ) -> Result<(), PipelineError> {
        Err(PipelineError::Rejected {
            kind: EntryKind::Interceptor,
            name: interceptor.name().to_string(),
            reason: "interceptors are not supported".to_string(),
        })
    }
}

#[test]
fn test_pipeline_rejection_propagates() {
    match GatewayFactory::new().create_with::<NoInterceptors>(ConfigMap::new()) {
        Err(FactoryError::Pipeline(PipelineError::Rejected { kind, name, .. })) => {
            assert_eq!(kind, EntryKind::Interceptor);
            assert_eq!(name, "endless_cycle_detector");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("build should fail"),
    }
}

// =============================================================================
// Config files
// =============================================================================

#[test]
fn test_build_from_config_file() {
    let shop = views_dir("layout.html", "<shop/>");
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("paygate.toml");
    fs::write(
        &path,
        format!(
            r#"
"gateway.template.layout" = "@Shop/layout.html"
"gateway.paths" = {{ Shop = "{}" }}
"gateway.default_options" = {{ sandbox = true }}
"#,
            shop.path().display()
        ),
    )
    .unwrap();

    let (config, source) = paygate::config::load_config_file(&path).unwrap();
    let resolved = GatewayFactory::new()
        .create_config(config)
        .unwrap()
        .with_sources(vec![source]);

    assert_eq!(resolved.get_data("sandbox"), Some(&json!(true)));
    assert_eq!(resolved.sources().len(), 1);

    let snapshot = resolved.snapshot();
    assert_eq!(snapshot["sources"][0]["path"], path.display().to_string());
    let layout = snapshot["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["key"] == keys::TEMPLATE_LAYOUT)
        .unwrap();
    assert_eq!(layout["origin"], "caller");
    assert_eq!(layout["value"], "@Shop/layout.html");
}
