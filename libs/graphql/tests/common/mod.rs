//! Common test utilities for GraphQL integration tests
//!
//! Provides a scripted `graphql-ws` server on a local port.

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
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

/// What the server does with a subscription
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Id sent with `connection_ack`
    pub ack_id: Option<String>,
    /// Answer `connection_init` with this `connection_error` instead of an ack
    pub connection_error: Option<Value>,
    /// Payloads sent as `data` frames after `start`
    pub data: Vec<Value>,
    /// Send `complete` after the data
    pub complete: bool,
}

/// A scripted graphql-ws server
///
/// - Records every frame it receives and the handshake headers
/// - Acknowledges `connection_init` (followed by a `ka`)
/// - Plays the scripted data on `start`
/// - Answers `stop` with `complete`
/// - Closes the socket on `connection_terminate`
pub struct GraphQLWsServer {
    pub addr: SocketAddr,
    pub received: Arc<Mutex<Vec<Value>>>,
    pub handshake: Arc<Mutex<Vec<(String, String)>>>,
    shutdown: Arc<Notify>,
}

impl GraphQLWsServer {
    pub async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let received = Arc::new(Mutex::new(Vec::new()));
        let handshake = Arc::new(Mutex::new(Vec::new()));

        let (shutdown_clone, received_clone, handshake_clone) =
            (shutdown.clone(), received.clone(), handshake.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let script = script.clone();
                                let received = received_clone.clone();
                                let handshake = handshake_clone.clone();
                                let shutdown = shutdown_clone.clone();
                                tokio::spawn(async move {
                                    handle_connection(stream, script, received, handshake, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => break,
                }
            }
        });

        Self {
            addr,
            received,
            handshake,
            shutdown,
        }
    }

    /// HTTP address; the client rewrites it to `ws://`
    pub fn http_url(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    pub fn frames(&self) -> Vec<Value> {
        self.received.lock().clone()
    }

    pub fn frame_types(&self) -> Vec<String> {
        self.frames()
            .iter()
            .map(|f| f["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Wait until at least `count` frames were received
    pub async fn wait_for_frames(&self, count: usize) -> Vec<Value> {
        for _ in 0..100 {
            let frames = self.frames();
            if frames.len() >= count {
                return frames;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("expected {} frames, got {:?}", count, self.frames());
    }

    pub fn handshake_header(&self, name: &str) -> Option<String> {
        self.handshake
            .lock()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for GraphQLWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    script: Script,
    received: Arc<Mutex<Vec<Value>>>,
    handshake: Arc<Mutex<Vec<(String, String)>>>,
    shutdown: Arc<Notify>,
) {
    let callback = |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
        let mut seen = handshake.lock();
        for (name, value) in request.headers() {
            seen.push((
                name.as_str().to_lowercase(),
                value.to_str().unwrap_or_default().to_string(),
            ));
        }
        if request.headers().contains_key("sec-websocket-protocol") {
            response
                .headers_mut()
                .insert("sec-websocket-protocol", "graphql-ws".parse().unwrap());
        }
        Ok(response)
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    loop {
        let text = tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
            _ = shutdown.notified() => break,
        };

        let frame: Value = match serde_json::from_str(&text) {
            Ok(frame) => frame,
            Err(_) => continue,
        };
        received.lock().push(frame.clone());

        let mut replies = Vec::new();
        match frame["type"].as_str() {
            Some("connection_init") => match &script.connection_error {
                Some(error) => replies.push(json!({ "type": "connection_error", "error": error })),
                None => {
                    replies.push(json!({ "type": "connection_ack", "id": script.ack_id }));
                    replies.push(json!({ "type": "ka" }));
                }
            },
            Some("start") => {
                let id = frame["id"].clone();
                for payload in &script.data {
                    replies.push(json!({ "type": "data", "id": id, "payload": payload }));
                }
                if script.complete {
                    replies.push(json!({ "type": "complete", "id": id }));
                }
            }
            Some("stop") => replies.push(json!({ "type": "complete", "id": frame["id"] })),
            Some("connection_terminate") => {
                let _ = write.send(Message::Close(None)).await;
                break;
            }
            _ => {}
        }

        for reply in replies {
            if write.send(Message::Text(reply.to_string())).await.is_err() {
                return;
            }
        }
    }
}
