//! # HyperSockets Traits
//!
//! Core traits and types shared by every HyperSockets transport:
//!
//! - **WsMessage**: A text or binary message
//! - **Headers**: Ordered header mapping sent with the opening handshake
//! - **Connector**: Factory seam for persistent connections
//! - **HyperSocketError**: Error type for connection operations

pub mod connector;
pub mod error;
pub mod headers;
pub mod message;

// Re-export commonly used types
pub use connector::Connector;
pub use error::{HyperSocketError, Result};
pub use headers::Headers;
pub use message::WsMessage;
