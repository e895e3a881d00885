use crate::traits::*;

/// Description of a connection to open
///
/// Holds everything a [`Connector`] needs for the opening handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// WebSocket URL (wss:// or ws://)
    pub(crate) url: String,

    /// Sub-protocols declared through `Sec-WebSocket-Protocol`
    pub(crate) protocols: Vec<String>,

    /// Extra HTTP headers for the handshake request
    pub(crate) headers: Headers,
}

impl ConnectRequest {
    /// Create a request for `url` with no sub-protocols and no headers
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            protocols: Vec::new(),
            headers: Headers::new(),
        }
    }

    /// Declare a sub-protocol
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Replace the handshake headers
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the declared sub-protocols
    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    /// Get the handshake headers
    pub fn handshake_headers(&self) -> &Headers {
        &self.headers
    }

    /// Value for the `Sec-WebSocket-Protocol` header, if any protocol is declared
    pub fn protocol_header(&self) -> Option<String> {
        if self.protocols.is_empty() {
            None
        } else {
            Some(self.protocols.join(", "))
        }
    }
}
