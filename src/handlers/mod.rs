//! Built-in handlers and interceptors
//!
//! These are the units registered by the builtin defaults. Request execution
//! is driven by the caller; each unit exposes the data it was built with plus
//! the lookups it performs.

mod cycle;

pub use cycle::{EndlessCycleDetector, DEFAULT_CYCLE_LIMIT};

use std::any::Any;
use std::sync::Arc;

use paygate_template::{TemplateEngine, TemplateError};
use thiserror::Error;

use crate::currency::{Currency, Iso4217};
use crate::gateway::Handler;
use crate::security::{Token, TokenStore};

/// Errors raised by built-in handlers
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("token not found: {0}")]
    TokenNotFound(String),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}

macro_rules! handler_name {
    ($ty:ty, $name:literal) => {
        impl Handler for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// Populates the incoming HTTP request details
#[derive(Debug, Default, Clone)]
pub struct GetHttpRequestHandler;

handler_name!(GetHttpRequestHandler, "get_http_request");

/// Turns a payment capture into a capture of its model details
#[derive(Debug, Default, Clone)]
pub struct CapturePaymentHandler;

handler_name!(CapturePaymentHandler, "capture_payment");

/// Re-executes a request against the model's details
#[derive(Debug, Default, Clone)]
pub struct ExecuteSameRequestWithModelDetailsHandler;

handler_name!(
    ExecuteSameRequestWithModelDetailsHandler,
    "execute_same_request_with_model_details"
);

/// Renders templates inside the configured layout
#[derive(Debug, Clone)]
pub struct RenderTemplateHandler {
    engine: Arc<TemplateEngine>,
    layout: String,
}

impl RenderTemplateHandler {
    pub fn new(engine: Arc<TemplateEngine>, layout: impl Into<String>) -> Self {
        Self {
            engine,
            layout: layout.into(),
        }
    }

    pub fn engine(&self) -> &Arc<TemplateEngine> {
        &self.engine
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Source of the layout template
    pub fn layout_source(&self) -> Result<String, HandlerError> {
        Ok(self.engine.source(&self.layout)?)
    }
}

handler_name!(RenderTemplateHandler, "render_template");

/// Resolves currency codes
#[derive(Debug, Clone)]
pub struct GetCurrencyHandler {
    iso4217: Arc<Iso4217>,
}

impl GetCurrencyHandler {
    pub fn new(iso4217: Arc<Iso4217>) -> Self {
        Self { iso4217 }
    }

    pub fn lookup(&self, code: &str) -> Result<&Currency, HandlerError> {
        self.iso4217
            .find(code)
            .ok_or_else(|| HandlerError::UnknownCurrency(code.to_string()))
    }
}

handler_name!(GetCurrencyHandler, "get_currency");

/// Fetches security tokens from the configured store
#[derive(Debug, Clone)]
pub struct GetTokenHandler {
    store: Arc<dyn TokenStore>,
}

impl GetTokenHandler {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn fetch(&self, hash: &str) -> Result<Token, HandlerError> {
        self.store
            .find(hash)
            .ok_or_else(|| HandlerError::TokenNotFound(hash.to_string()))
    }
}

handler_name!(GetTokenHandler, "get_token");
