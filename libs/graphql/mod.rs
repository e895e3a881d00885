//! # GraphQL
//!
//! A GraphQL client for queries and mutations over HTTP and subscriptions
//! over the `graphql-ws` WebSocket protocol.
//!
//! ## Components
//!
//! - **Result decoder** ([`decoder`]): JSON or text, by content type
//! - **Request executor** ([`executor`]): one POST, classified as success or [`ClientError`]
//! - **Subscription session** ([`subscription`]): explicit state machine over one connection
//! - **Client facade** ([`GraphQLClient`]): endpoint, default headers and the three operations
//!
//! ## Example
//!
//! ```no_run
//! use graphql::{FnObserver, GraphQLClient};
//!
//! # async fn run() {
//! let client = GraphQLClient::new("https://api.example.com/graphql");
//!
//! let handle = client.subscribe(
//!     "subscription { ticks }",
//!     None,
//!     FnObserver::new(|payload| println!("{payload}"))
//!         .on_complete(|| println!("done")),
//! );
//!
//! // Later
//! handle.cancel();
//! handle.closed().await;
//! # }
//! ```

pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod executor;
pub mod http;
pub mod options;
pub mod subscription;
pub mod types;

pub use client::{raw_request, request, subscribe, GraphQLClient};
pub use config::{ClientConfig, ConfigError};
pub use decoder::{decode, DecodedBody};
pub use error::{
    ClientError, ClientErrorResponse, Error, RequestContext, Result, SubscriptionError,
    TransportError,
};
pub use executor::RequestExecutor;
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use options::ClientOptions;
pub use subscription::{
    ChannelObserver, FnObserver, Observer, SessionState, SubscriptionHandle, SubscriptionStream,
};
pub use types::{variables, GraphQLRequest, GraphQLResponse, Variables};
