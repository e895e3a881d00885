//! In-memory connection pair
//!
//! Every transport in this crate is built from the same two halves:
//!
//! ```text
//!  caller side                                   far side
//! ┌──────────────────┐   ConnectionCommand   ┌────────────────┐
//! │ ConnectionHandle │ ────────────────────> │                │
//! │   (cloneable)    │                       │ ConnectionPeer │ <──> network driver
//! │ Connection       │ <──────────────────── │                │      or test code
//! │   (event queue)  │   ConnectionEvent     └────────────────┘
//! └──────────────────┘
//! ```
//!
//! A network driver such as [`WebSocketConnector`](crate::WebSocketConnector)
//! owns the peer and translates between channel traffic and socket frames.
//! Tests own the peer directly and play the server.
//!
//! Both queues are unbounded: sends never block and never apply backpressure.

use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::traits::*;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Event delivered from the far side of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Handshake accepted
    Open,
    /// Message received
    Message(WsMessage),
    /// Transport failure; a `Close` event follows
    Error(String),
    /// Connection finished
    Close { code: Option<u16>, reason: String },
}

/// Request from the caller side to the far side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCommand {
    /// Write a message
    Send(WsMessage),
    /// Close the connection
    Close,
}

/// Caller side of a connection
///
/// Owns the event queue. Sending goes through a [`ConnectionHandle`],
/// which can be cloned and moved to other tasks.
#[derive(Debug)]
pub struct Connection {
    handle: ConnectionHandle,
    events: UnboundedReceiver<ConnectionEvent>,
}

impl Connection {
    /// Create a connected in-memory pair
    pub fn channel() -> (Connection, ConnectionPeer) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Connecting));
        let metrics = Arc::new(AtomicMetrics::new());

        let connection = Connection {
            handle: ConnectionHandle {
                commands: command_tx,
                state: Arc::clone(&state),
                metrics: Arc::clone(&metrics),
            },
            events: event_rx,
        };

        let peer = ConnectionPeer {
            events: event_tx,
            commands: command_rx,
            state,
            metrics,
        };

        (connection, peer)
    }

    /// Get a handle for sending and closing
    pub fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    /// Send a message (see [`ConnectionHandle::send`])
    pub fn send(&self, message: impl Into<WsMessage>) -> Result<()> {
        self.handle.send(message)
    }

    /// Close the connection (see [`ConnectionHandle::close`])
    pub fn close(&self) -> Result<()> {
        self.handle.close()
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.handle.state()
    }

    /// Wait for the next event
    ///
    /// Returns `None` once the far side is gone and every queued event
    /// has been consumed.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        self.events.recv().await
    }

    /// Take the next event if one is already queued
    pub fn try_next_event(&mut self) -> Option<ConnectionEvent> {
        self.events.try_recv().ok()
    }
}

/// Cloneable sending half of a [`Connection`]
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    commands: UnboundedSender<ConnectionCommand>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
}

impl ConnectionHandle {
    /// Queue a message for the far side
    ///
    /// Messages queued while the handshake is still in progress are written
    /// once it completes. Fails once the connection is closing or closed.
    pub fn send(&self, message: impl Into<WsMessage>) -> Result<()> {
        match self.state.get() {
            ConnectionState::Closing | ConnectionState::Closed => {
                return Err(HyperSocketError::ConnectionClosed(
                    "cannot send on a closed connection".into(),
                ));
            }
            ConnectionState::Connecting | ConnectionState::Open => {}
        }

        self.commands
            .send(ConnectionCommand::Send(message.into()))
            .map_err(|e| HyperSocketError::ChannelSend(e.to_string()))?;
        self.metrics.increment_sent();
        Ok(())
    }

    /// Ask the far side to close
    ///
    /// Only the first call has an effect; later calls return `Ok(())`.
    pub fn close(&self) -> Result<()> {
        if !self.state.begin_closing() {
            debug!("Close requested on a connection that is already closing");
            return Ok(());
        }

        self.commands
            .send(ConnectionCommand::Close)
            .map_err(|e| HyperSocketError::ChannelSend(e.to_string()))
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn messages_sent(&self) -> u64 {
        self.metrics.messages_sent()
    }

    pub fn messages_received(&self) -> u64 {
        self.metrics.messages_received()
    }
}

/// Far side of a [`Connection`]
///
/// Owned by a network driver, or by a test standing in for a server.
#[derive(Debug)]
pub struct ConnectionPeer {
    events: UnboundedSender<ConnectionEvent>,
    commands: UnboundedReceiver<ConnectionCommand>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
}

impl ConnectionPeer {
    /// Deliver an event to the caller side, updating the shared state
    pub fn emit(&self, event: ConnectionEvent) -> Result<()> {
        match &event {
            ConnectionEvent::Open => {
                self.state
                    .transition(ConnectionState::Connecting, ConnectionState::Open);
            }
            ConnectionEvent::Message(_) => self.metrics.increment_received(),
            ConnectionEvent::Error(_) => {}
            ConnectionEvent::Close { .. } => self.state.set(ConnectionState::Closed),
        }

        self.events
            .send(event)
            .map_err(|e| HyperSocketError::ChannelSend(e.to_string()))
    }

    /// Report a completed handshake
    pub fn open(&self) -> Result<()> {
        self.emit(ConnectionEvent::Open)
    }

    /// Deliver a text message
    pub fn text(&self, text: impl Into<String>) -> Result<()> {
        self.emit(ConnectionEvent::Message(WsMessage::Text(text.into())))
    }

    /// Report a transport failure
    pub fn error(&self, error: impl Into<String>) -> Result<()> {
        self.emit(ConnectionEvent::Error(error.into()))
    }

    /// Report that the connection finished
    pub fn closed(&self, code: Option<u16>, reason: impl Into<String>) -> Result<()> {
        self.emit(ConnectionEvent::Close {
            code,
            reason: reason.into(),
        })
    }

    /// Wait for the next command from the caller side
    ///
    /// Returns `None` once every handle and the connection were dropped.
    pub async fn recv_command(&mut self) -> Option<ConnectionCommand> {
        self.commands.recv().await
    }

    /// Take the next command if one is already queued
    pub fn try_recv_command(&mut self) -> Option<ConnectionCommand> {
        self.commands.try_recv().ok()
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Mark the connection finished without notifying the caller side
    pub(crate) fn mark_closed(&self) {
        self.state.set(ConnectionState::Closed);
    }
}
