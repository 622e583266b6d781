//! Transport abstraction for backend calls.
//!
//! The [`Transport`] trait is the only capability the rest of the crate
//! needs from the network: send one GET/POST/DELETE and get JSON back or a
//! [`TransportError`]. Tests substitute a scripted transport that never
//! touches a socket.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// One backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    /// Opaque session token forwarded as a bearer credential.
    pub bearer: Option<String>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_string);
        self
    }
}

pub trait Transport: Send + Sync {
    /// Perform `request`. An empty success body yields `Value::Null`.
    fn send(&self, request: Request) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// [`Transport`] over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// `timeout` bounds each whole request, connect through body.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip_all, fields(method = ?request.method, url = %request.url))]
    async fn send(&self, request: Request) -> Result<Value, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(error = %err, "request failed");
            TransportError::Request {
                url: request.url.clone(),
                message: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "non-success status");
            return Err(TransportError::Status {
                url: request.url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|err| TransportError::Body {
            url: request.url.clone(),
            message: err.to_string(),
        })?;
        debug!(bytes = bytes.len(), "response received");
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|err| TransportError::Body {
            url: request.url,
            message: err.to_string(),
        })
    }
}
