//! Common test utilities for HyperSockets integration tests
//!
//! This module provides a local WebSocket server for exercising the real
//! tokio-tungstenite transport.

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Handshake headers seen by the server, lowercased names
pub type SeenHeaders = Arc<Mutex<Vec<(String, String)>>>;

/// A simple mock WebSocket server for testing
///
/// - Echoes text and binary messages
/// - Answers `close-me` with a close frame (code 4000, reason `requested`)
/// - Echoes the first requested sub-protocol back in the handshake response
pub struct MockWsServer {
    pub addr: SocketAddr,
    pub seen_headers: SeenHeaders,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let shutdown_clone = shutdown.clone();
        let seen_headers: SeenHeaders = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen_headers.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let shutdown = shutdown_clone.clone();
                                let seen = seen_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, seen, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            seen_headers,
            shutdown,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        seen: SeenHeaders,
        shutdown: Arc<Notify>,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_hdr_async;

        let callback = |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
            let mut seen = seen.lock();
            for (name, value) in request.headers() {
                seen.push((
                    name.as_str().to_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                ));
            }
            if let Some(protocols) = request.headers().get("sec-websocket-protocol") {
                let first = protocols
                    .to_str()
                    .unwrap_or_default()
                    .split(',')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                response
                    .headers_mut()
                    .insert("sec-websocket-protocol", first.parse().unwrap());
            }
            Ok(response)
        };

        let ws_stream = match accept_hdr_async(stream, callback).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) if text == "close-me" => {
                            let frame = CloseFrame {
                                code: CloseCode::from(4000),
                                reason: "requested".into(),
                            };
                            let _ = write.send(Message::Close(Some(frame))).await;
                            break;
                        }
                        Some(Ok(msg)) => {
                            if msg.is_text() || msg.is_binary() {
                                // Echo the message back
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Look up a handshake header the server received
    pub fn seen_header(&self, name: &str) -> Option<String> {
        self.seen_headers
            .lock()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
