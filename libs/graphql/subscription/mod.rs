//! GraphQL subscriptions over the `graphql-ws` protocol
//!
//! A subscription is one [`SubscriptionSession`] running on its own tokio
//! task. The caller keeps a [`SubscriptionHandle`] to cancel it or wait for
//! it to finish, and receives events through an [`Observer`].

pub mod frame;
pub mod observer;
pub mod session;

pub use frame::{ClientFrame, ServerFrame, StartPayload};
pub use observer::{ChannelObserver, FnObserver, Observer, StreamItem, SubscriptionStream};
pub use session::{SessionParams, SessionState, SubscriptionHandle, SubscriptionSession};

/// Sub-protocol declared in the WebSocket handshake
pub const GRAPHQL_WS_PROTOCOL: &str = "graphql-ws";

/// Rewrite an HTTP endpoint into its WebSocket address
///
/// Only the literal leading `http` is replaced, so `https://` becomes
/// `wss://`. Anything else is returned unchanged.
///
/// ```
/// use graphql::subscription::websocket_url;
///
/// assert_eq!(websocket_url("https://api.example.com/graphql"), "wss://api.example.com/graphql");
/// assert_eq!(websocket_url("http://localhost:4000"), "ws://localhost:4000");
/// assert_eq!(websocket_url("wss://already"), "wss://already");
/// ```
pub fn websocket_url(endpoint: &str) -> String {
    match endpoint.strip_prefix("http") {
        Some(rest) => format!("ws{}", rest),
        None => endpoint.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url_is_case_sensitive() {
        assert_eq!(websocket_url("HTTP://host"), "HTTP://host");
        assert_eq!(websocket_url("http://host/graphql"), "ws://host/graphql");
        assert_eq!(websocket_url("https://host"), "wss://host");
    }
}
