//! # HyperSockets
//!
//! A small, modular client for persistent message-based connections.
//!
//! ## Features
//!
//! - **Channel-based connections**: every transport drives the far side of an
//!   in-memory [`Connection`] pair, so protocol code can be tested without a socket
//! - **Injected transports**: protocol code depends on the [`Connector`] trait,
//!   with [`WebSocketConnector`] (tokio-tungstenite) as the default
//! - **Lock-free state**: atomic connection state and message counters
//! - **Ordered headers**: handshake headers keep insertion order

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core functionality
pub use core::{
    client, config, connection, connection_state,
    client::WebSocketConnector,
    config::ConnectRequest,
    connection::{Connection, ConnectionCommand, ConnectionEvent, ConnectionHandle, ConnectionPeer},
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
};
