//! Subscription session state machine
//!
//! One session owns one connection and carries one subscription:
//!
//! ```text
//!  Connecting ──open / connection_init──> AckWait
//!  AckWait ──connection_ack / start──> Active
//!  Active ──data──> Active (observer.next)
//!  Active ──stop (caller or server) / connection_terminate──> Terminating
//!  Active | Terminating ──complete──> Closed (observer.complete, then close)
//!  any ──connection_terminate──> Closed
//!  any ──connection_error | transport error | close──> Closed
//! ```
//!
//! Frames that are not legal for the current state are reported through
//! `observer.error` as [`SubscriptionError::Protocol`] and otherwise ignored.

use super::frame::{ClientFrame, ServerFrame, StartPayload};
use super::observer::Observer;
use super::GRAPHQL_WS_PROTOCOL;
use crate::error::SubscriptionError;
use crate::types::GraphQLRequest;
use hypersockets::{ConnectRequest, Connection, ConnectionEvent, Connector, Headers, WsMessage};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Correlation id used when the server's ack carries none
pub const DEFAULT_SUBSCRIPTION_ID: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Waiting for the transport to open
    Connecting,
    /// `connection_init` sent, waiting for `connection_ack`
    AckWait,
    /// `start` sent, receiving data
    Active,
    /// `connection_terminate` sent, waiting for the server to finish
    Terminating,
    /// Connection closed; terminal
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "CONNECTING",
            SessionState::AckWait => "ACK_WAIT",
            SessionState::Active => "ACTIVE",
            SessionState::Terminating => "TERMINATING",
            SessionState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
enum SessionCommand {
    Cancel,
}

/// Caller side of a running subscription
///
/// Cloneable. Dropping every handle does not end the subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    state: watch::Receiver<SessionState>,
    correlation_id: Arc<Mutex<Option<String>>>,
}

impl SubscriptionHandle {
    /// Cancel the subscription
    ///
    /// Sends `stop` with the current correlation id (`null` before the ack),
    /// then `connection_terminate`. Fire-and-forget: returns before the
    /// server acknowledges, and does nothing once the session is terminating
    /// or closed.
    pub fn cancel(&self) {
        if self.commands.send(SessionCommand::Cancel).is_err() {
            debug!("Cancel on a finished subscription");
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// The id assigned by `connection_ack`, if received yet
    pub fn correlation_id(&self) -> Option<String> {
        self.correlation_id.lock().clone()
    }

    /// Wait until the session reaches `Closed`
    pub async fn closed(&self) {
        let mut state = self.state.clone();
        // The sender only goes away after publishing `Closed`
        let _ = state.wait_for(|s| *s == SessionState::Closed).await;
    }
}

/// Everything needed to open a session
pub struct SessionParams {
    /// `ws://` or `wss://` address
    pub url: String,
    /// Headers for the opening handshake
    pub headers: Headers,
    /// `connection_init` payload
    pub init_payload: Value,
    pub request: GraphQLRequest,
}

/// A running subscription; see the module docs for the state machine
pub struct SubscriptionSession {
    connection: Connection,
    request: GraphQLRequest,
    init_payload: Value,
    observer: Box<dyn Observer>,
    state: SessionState,
    state_tx: watch::Sender<SessionState>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    correlation_id: Arc<Mutex<Option<String>>>,
}

impl SubscriptionSession {
    /// Open a connection and start the session on the current tokio runtime
    ///
    /// Returns immediately. Without a runtime the observer receives a
    /// transport error and the handle reports `Closed`.
    pub fn spawn(
        connector: &dyn Connector,
        params: SessionParams,
        observer: Box<dyn Observer>,
    ) -> SubscriptionHandle {
        let connect_request = ConnectRequest::new(params.url)
            .protocol(GRAPHQL_WS_PROTOCOL)
            .headers(params.headers);
        debug!(url = %connect_request.url(), "Opening subscription");
        let connection = connector.connect(connect_request);

        let (session, handle) = Self::new(connection, params.request, params.init_payload, observer);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(session.run());
            }
            Err(e) => {
                error!("No tokio runtime available for subscription: {}", e);
                session.abort(SubscriptionError::Transport(format!("no tokio runtime: {}", e)));
            }
        }

        handle
    }

    /// Build a session over an existing connection without starting it
    pub fn new(
        connection: Connection,
        request: GraphQLRequest,
        init_payload: Value,
        observer: Box<dyn Observer>,
    ) -> (Self, SubscriptionHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Connecting);
        let correlation_id = Arc::new(Mutex::new(None));

        let handle = SubscriptionHandle {
            commands: command_tx,
            state: state_rx,
            correlation_id: Arc::clone(&correlation_id),
        };

        let session = Self {
            connection,
            request,
            init_payload,
            observer,
            state: SessionState::Connecting,
            state_tx,
            commands: command_rx,
            correlation_id,
        };

        (session, handle)
    }

    /// Drive the session until it is closed
    pub async fn run(mut self) {
        while self.state != SessionState::Closed {
            tokio::select! {
                event = self.connection.next_event() => match event {
                    Some(event) => self.handle_event(event),
                    None => self.handle_close(None, "connection dropped".into()),
                },
                Some(command) = self.commands.recv() => self.handle_command(command),
            }
        }
        debug!("Subscription session finished");
    }

    fn abort(mut self, error: SubscriptionError) {
        self.observer.error(error);
        self.close();
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Cancel => match self.state {
                SessionState::Terminating | SessionState::Closed => {
                    debug!(state = %self.state, "Ignoring repeated cancel");
                }
                _ => {
                    let id = self.correlation_id.lock().clone();
                    info!(id = ?id, "Cancelling subscription");
                    self.send(ClientFrame::Stop { id });
                    self.terminate();
                }
            },
        }
    }

    fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Open => match self.state {
                SessionState::Connecting => {
                    let payload = self.init_payload.clone();
                    self.send(ClientFrame::ConnectionInit { payload });
                    self.set_state(SessionState::AckWait);
                }
                state => debug!(%state, "Ignoring open event"),
            },
            ConnectionEvent::Message(message) => self.handle_message(message),
            ConnectionEvent::Error(reason) => {
                error!(%reason, "Subscription transport failed");
                self.observer.error(SubscriptionError::Transport(reason));
                self.close();
            }
            ConnectionEvent::Close { code, reason } => self.handle_close(code, reason),
        }
    }

    fn handle_close(&mut self, code: Option<u16>, reason: String) {
        if self.state != SessionState::Terminating {
            warn!(?code, %reason, state = %self.state, "Connection closed before the subscription finished");
            self.observer
                .error(SubscriptionError::ConnectionClosed { code, reason });
        }
        self.set_state(SessionState::Closed);
    }

    fn handle_message(&mut self, message: WsMessage) {
        let Some(text) = message.to_text() else {
            self.observer
                .error(SubscriptionError::Decode("binary frame is not valid UTF-8".into()));
            return;
        };

        match ServerFrame::parse(text) {
            Ok(frame) => self.handle_frame(frame),
            Err(e) => {
                warn!(error = %e, "Invalid frame");
                self.observer.error(SubscriptionError::Decode(e.to_string()));
            }
        }
    }

    fn handle_frame(&mut self, frame: ServerFrame) {
        use SessionState::*;

        match (self.state, frame) {
            (AckWait, ServerFrame::ConnectionAck { id }) => {
                let id = id.unwrap_or_else(|| DEFAULT_SUBSCRIPTION_ID.to_string());
                *self.correlation_id.lock() = Some(id.clone());

                let payload = StartPayload {
                    query: self.request.query.clone(),
                    variables: self.request.variables.clone(),
                    context: self.request.context.clone(),
                };
                debug!(%id, "Connection acknowledged, starting subscription");
                self.send(ClientFrame::Start { id, payload });
                self.set_state(Active);
            }
            (Active, ServerFrame::Data { payload }) => self.observer.next(payload),
            (Active, ServerFrame::Error { payload }) => {
                warn!(%payload, "Subscription error");
                self.observer.error(SubscriptionError::Operation(payload));
                self.close();
            }
            (Active | AckWait, ServerFrame::Stop { .. }) => {
                debug!("Server stopped the subscription");
                self.terminate();
            }
            (Active | Terminating, ServerFrame::Complete { .. }) => {
                self.observer.complete();
                self.close();
            }
            (
                Terminating,
                ServerFrame::ConnectionAck { .. }
                | ServerFrame::Data { .. }
                | ServerFrame::Error { .. }
                | ServerFrame::Stop { .. },
            ) => {
                debug!("Dropping frame while terminating");
            }
            (Terminating, ServerFrame::ConnectionError { .. }) => {
                debug!("Dropping connection error while terminating");
            }
            (_, ServerFrame::ConnectionError { error, payload }) => {
                let error = if error.is_null() { payload } else { error };
                warn!(%error, "Connection error");
                self.observer.error(SubscriptionError::ConnectionError(error));
                self.close();
            }
            (_, ServerFrame::KeepAlive) => {}
            (_, ServerFrame::ConnectionTerminate { .. }) => {
                debug!("Server terminated the connection");
                self.close();
            }
            (state, frame) => {
                warn!(frame = frame.kind(), %state, "Unexpected frame");
                self.observer.error(SubscriptionError::Protocol {
                    frame: frame.kind().to_string(),
                    state,
                });
            }
        }
    }

    fn terminate(&mut self) {
        self.send(ClientFrame::ConnectionTerminate);
        self.set_state(SessionState::Terminating);
    }

    fn close(&mut self) {
        if let Err(e) = self.connection.close() {
            debug!("Close failed: {}", e);
        }
        self.set_state(SessionState::Closed);
    }

    fn send(&mut self, frame: ClientFrame) {
        let text = match frame.to_json() {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode frame: {}", e);
                return;
            }
        };

        if let Err(e) = self.connection.send(text) {
            debug!("Dropping outgoing frame: {}", e);
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "Session state change");
            self.state = state;
            self.state_tx.send_replace(state);
        }
    }
}
