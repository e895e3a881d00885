//! Client options
//!
//! The option bag a [`GraphQLClient`](crate::GraphQLClient) carries. Its
//! serialized form is the `connection_init` payload, so transport-only
//! settings are kept out of it.

use hypersockets::Headers;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Default headers sent with every request and the WebSocket handshake
    #[serde(default)]
    pub headers: Headers,

    /// HTTP request timeout in milliseconds
    #[serde(default, skip_serializing)]
    pub timeout_ms: Option<u64>,

    /// Any other transport overrides, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// The `connection_init` payload
    pub fn to_init_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}
