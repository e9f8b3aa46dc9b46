//! Reserved configuration keys
//!
//! Keys follow `<family>.<subfamily>.<name>`. Everything under one of the
//! three bucket namespaces is registered into the gateway.

/// Prefix of handler entries
pub const HANDLER_NAMESPACE: &str = "gateway.handler.";
/// Prefix of capability entries
pub const CAPABILITY_NAMESPACE: &str = "gateway.capability.";
/// Prefix of interceptor entries
pub const INTERCEPTOR_NAMESPACE: &str = "gateway.interceptor.";

pub const PREPEND_HANDLERS: &str = "gateway.prepend_handlers";
pub const PREPEND_CAPABILITIES: &str = "gateway.prepend_capabilities";
pub const PREPEND_INTERCEPTORS: &str = "gateway.prepend_interceptors";

/// Caller override of the raw HTTP transport
pub const TRANSPORT_CLIENT: &str = "transport.client";
/// Settings used to build the default transport
pub const TRANSPORT_OPTIONS: &str = "transport.options";
/// HTTP client wrapping the transport
pub const HTTP_CLIENT: &str = "gateway.http_client";

pub const TEMPLATE_LOADER: &str = "template.loader";
pub const TEMPLATE_ENGINE: &str = "template.engine";
pub const TEMPLATE_LAYOUT: &str = "gateway.template.layout";
/// Template namespace -> directory registry
pub const PATHS: &str = "gateway.paths";

pub const ISO4217: &str = "gateway.iso4217";
pub const DEFAULT_OPTIONS: &str = "gateway.default_options";
pub const REQUIRED_OPTIONS: &str = "gateway.required_options";
pub const TOKEN_STORAGE: &str = "gateway.security.token_storage";

pub const HANDLER_GET_HTTP_REQUEST: &str = "gateway.handler.get_http_request";
pub const HANDLER_CAPTURE_PAYMENT: &str = "gateway.handler.capture_payment";
pub const HANDLER_EXECUTE_SAME_REQUEST: &str =
    "gateway.handler.execute_same_request_with_model_details";
pub const HANDLER_RENDER_TEMPLATE: &str = "gateway.handler.render_template";
pub const HANDLER_GET_CURRENCY: &str = "gateway.handler.get_currency";
pub const HANDLER_GET_TOKEN: &str = "gateway.handler.get_token";
pub const INTERCEPTOR_ENDLESS_CYCLE_DETECTOR: &str = "gateway.interceptor.endless_cycle_detector";
pub const CAPABILITY_HTTP_CLIENT: &str = "gateway.capability.http_client";

/// Template namespace of the builtin views
pub const CORE_TEMPLATE_NAMESPACE: &str = "GatewayCore";
