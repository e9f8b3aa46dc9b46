//! HTTP transport
//!
//! Abstracts the HTTP client for testability. Provides:
//! - HttpClient trait: interface for sending requests
//! - ReqwestTransport: blocking client used as the default transport
//! - GatewayHttpClient: capability exposed to handlers, delegating to a transport

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gateway::Capability;

/// An outgoing HTTP request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// A received HTTP response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Interface for sending HTTP requests
pub trait HttpClient: Send + Sync + fmt::Debug {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Settings for the default transport, read from `transport.options`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportSettings {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("paygate/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

/// Blocking HTTP transport backed by reqwest
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        if settings.timeout_seconds == 0 {
            return Err(TransportError::Build(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }
}

impl HttpClient for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// HTTP access exposed to handlers as a capability
#[derive(Debug, Clone)]
pub struct GatewayHttpClient {
    transport: Arc<dyn HttpClient>,
}

impl GatewayHttpClient {
    pub fn new(transport: Arc<dyn HttpClient>) -> Self {
        Self { transport }
    }

    /// Underlying transport
    pub fn transport(&self) -> &Arc<dyn HttpClient> {
        &self.transport
    }
}

impl HttpClient for GatewayHttpClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        self.transport.send(request)
    }
}

impl Capability for GatewayHttpClient {
    fn name(&self) -> &str {
        "http_client"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
