//! Client facade
//!
//! [`GraphQLClient`] holds an endpoint and an option bag, and exposes the
//! three operations. The free functions build a throwaway client with no
//! options for a single call.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::options::ClientOptions;
use crate::subscription::{
    websocket_url, ChannelObserver, Observer, SessionParams, SubscriptionHandle,
    SubscriptionSession, SubscriptionStream,
};
use crate::types::{GraphQLRequest, GraphQLResponse, Variables};
use hypersockets::{Connector, Headers, WebSocketConnector};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

/// A GraphQL client bound to one endpoint
///
/// # Example
/// ```no_run
/// use graphql::GraphQLClient;
/// use serde_json::Value;
///
/// # async fn run() -> graphql::Result<()> {
/// let mut client = GraphQLClient::new("https://api.example.com/graphql");
/// client
///     .set_header("Authorization", "Bearer token")
///     .set_header("X-Client", "docs");
///
/// let data: Value = client.request("{ viewer { login } }", None).await?;
/// println!("{}", data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    endpoint: String,
    options: ClientOptions,
    transport: Arc<dyn HttpTransport>,
    connector: Arc<dyn Connector>,
}

impl GraphQLClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_options(endpoint, ClientOptions::default())
    }

    pub fn with_options(endpoint: impl Into<String>, options: ClientOptions) -> Self {
        let transport = match options.timeout() {
            Some(timeout) => ReqwestTransport::with_timeout(timeout).unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with {:?} timeout, using defaults: {}", timeout, e);
                ReqwestTransport::new()
            }),
            None => ReqwestTransport::new(),
        };

        Self {
            endpoint: endpoint.into(),
            options,
            transport: Arc::new(transport),
            connector: Arc::new(WebSocketConnector::new()),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_options(config.endpoint.clone(), config.client_options())
    }

    /// Replace the HTTP transport
    pub fn with_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replace the connection factory used for subscriptions
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn headers(&self) -> &Headers {
        &self.options.headers
    }

    /// Replace every default header
    pub fn set_headers(&mut self, headers: Headers) -> &mut Self {
        self.options.headers = headers;
        self
    }

    /// Insert or overwrite one default header
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.headers.insert(key, value);
        self
    }

    fn executor(&self) -> RequestExecutor<'_> {
        RequestExecutor::new(self.transport.as_ref(), &self.endpoint, &self.options.headers)
    }

    /// Execute an operation and return the full result envelope
    pub async fn raw_request(
        &self,
        query: &str,
        variables: Option<Variables>,
    ) -> Result<GraphQLResponse> {
        let request = GraphQLRequest::new(query, variables);
        self.executor().raw_request(&request).await
    }

    /// Execute an operation and return its `data`
    pub async fn request<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Variables>,
    ) -> Result<T> {
        let request = GraphQLRequest::new(query, variables);
        self.executor().request(&request).await
    }

    /// Start a subscription
    ///
    /// Connects to the endpoint with `http` rewritten to `ws`. The default
    /// headers go into the handshake and the `start` context, and the option
    /// bag is the `connection_init` payload. Must be called within a tokio
    /// runtime; failures are reported to `observer`.
    pub fn subscribe(
        &self,
        query: &str,
        variables: Option<Variables>,
        observer: impl Observer,
    ) -> SubscriptionHandle {
        let mut request = GraphQLRequest::new(query, variables);
        if !self.options.headers.is_empty() {
            request = request.with_context(self.options.headers.clone());
        }

        let params = SessionParams {
            url: websocket_url(&self.endpoint),
            headers: self.options.headers.clone(),
            init_payload: self.options.to_init_payload(),
            request,
        };

        SubscriptionSession::spawn(self.connector.as_ref(), params, Box::new(observer))
    }

    /// Start a subscription consumed as a stream
    pub fn subscribe_stream(&self, query: &str, variables: Option<Variables>) -> SubscriptionStream {
        let (observer, receiver) = ChannelObserver::new();
        let handle = self.subscribe(query, variables, observer);
        SubscriptionStream::new(receiver, handle)
    }
}

impl std::fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("endpoint", &self.endpoint)
            .field("options", &self.options)
            .finish()
    }
}

/// One-shot [`GraphQLClient::request`]
pub async fn request<T: DeserializeOwned>(
    endpoint: &str,
    query: &str,
    variables: Option<Variables>,
) -> Result<T> {
    GraphQLClient::new(endpoint).request(query, variables).await
}

/// One-shot [`GraphQLClient::raw_request`]
pub async fn raw_request(
    endpoint: &str,
    query: &str,
    variables: Option<Variables>,
) -> Result<GraphQLResponse> {
    GraphQLClient::new(endpoint).raw_request(query, variables).await
}

/// One-shot [`GraphQLClient::subscribe`]
pub fn subscribe(
    endpoint: &str,
    query: &str,
    variables: Option<Variables>,
    observer: impl Observer,
) -> SubscriptionHandle {
    GraphQLClient::new(endpoint).subscribe(query, variables, observer)
}
