//! Error types
//!
//! Request-path failures are returned as [`Error`]. Subscription-path
//! failures never surface as a return value; they reach the observer as a
//! [`SubscriptionError`].

use crate::subscription::SessionState;
use crate::types::Variables;
use hypersockets::Headers;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Main error type for request operations
#[derive(Error, Debug)]
pub enum Error {
    /// The request completed but failed the success predicate
    #[error(transparent)]
    Response(Box<ClientError>),

    /// The HTTP call itself failed
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] TransportError),

    /// Malformed JSON under a JSON content type, or `data` of the wrong shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// The client error, if the request reached the server
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Error::Response(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClientError> for Error {
    fn from(e: ClientError) -> Self {
        Error::Response(Box::new(e))
    }
}

/// Result type for request operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of the HTTP transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// A request that completed without satisfying the success predicate
#[derive(Debug, Clone, PartialEq)]
pub struct ClientError {
    pub response: ClientErrorResponse,
    pub request: RequestContext,
}

/// Response side of a [`ClientError`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClientErrorResponse {
    /// Decoded payload fields; a text body is wrapped as `{"error": <text>}`
    pub body: Map<String, Value>,
    pub status: u16,
    /// Present for `raw_request`, absent for `request`
    pub headers: Option<Headers>,
}

/// The operation that failed
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub query: String,
    pub variables: Option<Variables>,
}

impl ClientErrorResponse {
    /// The GraphQL `errors` array, if the server sent one
    pub fn errors(&self) -> Option<&Vec<Value>> {
        self.body.get("errors").and_then(Value::as_array)
    }

    /// The raw text body, for non-JSON responses
    pub fn error_text(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// The payload merged with status (and headers when present)
    pub fn to_json(&self) -> Value {
        let mut merged = self.body.clone();
        if let Some(headers) = &self.headers {
            merged.insert(
                "headers".into(),
                serde_json::to_value(headers).unwrap_or(Value::Null),
            );
        }
        merged.insert("status".into(), Value::from(self.status));
        Value::Object(merged)
    }
}

impl ClientError {
    /// Short description: the first GraphQL error message, or the status
    pub fn message(&self) -> String {
        self.response
            .errors()
            .and_then(|errors| errors.first())
            .and_then(|first| first.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("GraphQL Error (Code: {})", self.response.status))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = serde_json::json!({
            "response": self.response.to_json(),
            "request": {
                "query": self.request.query,
                "variables": self.request.variables,
            },
        });
        write!(f, "{}: {}", self.message(), details)
    }
}

impl std::error::Error for ClientError {}

/// Failure reported to a subscription observer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubscriptionError {
    /// The server rejected the connection (`connection_error` frame)
    #[error("connection error: {0}")]
    ConnectionError(Value),

    /// The server reported an operation error (`error` frame)
    #[error("operation error: {0}")]
    Operation(Value),

    /// The transport failed
    #[error("transport error: {0}")]
    Transport(String),

    /// The connection closed before the subscription completed
    #[error("connection closed (code {code:?}): {reason}")]
    ConnectionClosed { code: Option<u16>, reason: String },

    /// A frame arrived that is not legal in the current session state
    #[error("unexpected {frame} frame while {state}")]
    Protocol { frame: String, state: SessionState },

    /// A frame could not be decoded
    #[error("invalid frame: {0}")]
    Decode(String),
}
