//! # HyperSockets Core
//!
//! Connection primitives and the tokio-tungstenite transport.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hypersockets::core::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let request = ConnectRequest::new("wss://api.example.com/graphql")
//!         .protocol("graphql-ws");
//!
//!     let mut connection = WebSocketConnector::new().connect(request);
//!
//!     while let Some(event) = connection.next_event().await {
//!         match event {
//!             ConnectionEvent::Open => connection.send(r#"{"type":"connection_init"}"#)?,
//!             ConnectionEvent::Message(msg) => println!("Received: {:?}", msg),
//!             ConnectionEvent::Error(e) => eprintln!("Error: {}", e),
//!             ConnectionEvent::Close { .. } => break,
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod connection_state;

// Re-export main types
pub use client::WebSocketConnector;
pub use config::ConnectRequest;
pub use connection::{
    Connection, ConnectionCommand, ConnectionEvent, ConnectionHandle, ConnectionPeer,
};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};

// Re-export traits for convenience
pub use crate::traits::*;
