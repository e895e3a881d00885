//! HTTP transport seam
//!
//! The request executor only needs a single POST. [`HttpTransport`] exposes
//! exactly that, so tests and alternative clients can stand in for
//! [`ReqwestTransport`].

use crate::error::TransportError;
use async_trait::async_trait;
use hypersockets::Headers;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// A minimal async HTTP client for POST requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP POST request and return the response
    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError>;
}

/// A minimal HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: u16,

    /// Response headers in arrival order
    pub headers: Headers,

    /// The response body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a response header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// A [`reqwest`]-backed implementation of [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new reqwest-backed transport with default settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a new reqwest-backed transport with a request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError> {
        let mut req = self.inner.post(url);
        for (name, value) in headers.iter() {
            req = req.header(name, value);
        }

        debug!(url, bytes = body.len(), "Sending POST");
        let response = req.body(body).send().await?;
        let status = response.status().as_u16();

        let mut resp_headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                resp_headers.append(name.as_str(), value);
            }
        }

        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers: resp_headers,
            body,
        })
    }
}
