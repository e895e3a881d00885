use crate::config::ConnectRequest;
use crate::connection::{Connection, ConnectionCommand, ConnectionEvent, ConnectionPeer};
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket transport built on tokio-tungstenite
///
/// Each call to [`Connector::connect`] spawns one tokio task that owns the
/// socket for the connection's lifetime:
/// - Performs the handshake with the requested sub-protocols and headers
/// - Emits `Open`, then every text/binary frame in arrival order
/// - Writes queued messages in the order they were sent
/// - Emits `Error` then `Close` on failure, `Close` on a normal shutdown
///
/// There is no reconnection: a closed connection stays closed.
///
/// `connect` must be called from within a tokio runtime. Without one the
/// returned connection reports an error and closes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn connect(&self, request: ConnectRequest) -> Connection {
        let (connection, peer) = Connection::channel();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(run_connection(request, peer));
            }
            Err(e) => {
                error!("No tokio runtime available for {}: {}", request.url(), e);
                fail(&peer, format!("no tokio runtime: {}", e));
            }
        }

        connection
    }
}

/// Connection task: handshake, then pump frames until either side closes
async fn run_connection(request: ConnectRequest, mut peer: ConnectionPeer) {
    let client_request = match build_request(&request) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create request: {}", e);
            fail(&peer, e.to_string());
            return;
        }
    };

    debug!(url = %request.url(), protocols = ?request.protocols(), "Connecting");

    let ws_stream = match connect_async(client_request).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            error!("Failed to connect: {}", e);
            fail(&peer, e.to_string());
            return;
        }
    };

    info!("Connected to {}", request.url());
    if peer.open().is_err() {
        debug!("Connection dropped during handshake, closing socket");
        let mut ws_stream = ws_stream;
        let _ = ws_stream.close(None).await;
        peer.mark_closed();
        return;
    }

    message_loop(ws_stream, &mut peer).await;
    debug!("Connection task exiting");
}

/// Main message processing loop
async fn message_loop(ws_stream: WsStream, peer: &mut ConnectionPeer) {
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            // Handle incoming messages
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (Some(u16::from(f.code)), f.reason.to_string()))
                            .unwrap_or((None, String::new()));
                        info!(?code, %reason, "Server closed connection");
                        let _ = peer.closed(code, reason);
                        return;
                    }
                    Some(Ok(msg)) => {
                        if let Some(ws_msg) = tungstenite_to_ws_message(msg) {
                            if peer.emit(ConnectionEvent::Message(ws_msg)).is_err() {
                                debug!("Connection dropped, closing socket");
                                let _ = write.close().await;
                                peer.mark_closed();
                                return;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        fail(peer, e.to_string());
                        return;
                    }
                    None => {
                        warn!("WebSocket stream closed");
                        let _ = peer.closed(None, "stream ended");
                        return;
                    }
                }
            }

            // Handle commands from connection handles
            cmd = peer.recv_command() => {
                match cmd {
                    Some(ConnectionCommand::Send(msg)) => {
                        if let Err(e) = write.send(ws_message_to_tungstenite(msg)).await {
                            error!("Failed to send message: {}", e);
                            fail(peer, e.to_string());
                            return;
                        }
                    }
                    Some(ConnectionCommand::Close) | None => {
                        debug!("Closing connection");
                        if let Err(e) = write.close().await {
                            debug!("Close handshake failed: {}", e);
                        }
                        let _ = peer.closed(Some(1000), "closed by client");
                        return;
                    }
                }
            }
        }
    }
}

/// Report a failure followed by the final close event
fn fail(peer: &ConnectionPeer, reason: String) {
    let _ = peer.error(reason.clone());
    let _ = peer.closed(None, reason);
}

/// Build the handshake request, applying sub-protocols and headers
fn build_request(request: &ConnectRequest) -> Result<Request> {
    let mut client_request = request
        .url()
        .into_client_request()
        .map_err(|e| HyperSocketError::Configuration(e.to_string()))?;

    for (key, value) in request.handshake_headers().iter() {
        match key.parse::<http::header::HeaderName>() {
            Ok(header_name) => match value.parse::<http::header::HeaderValue>() {
                Ok(header_value) => {
                    client_request.headers_mut().insert(header_name, header_value);
                }
                Err(_) => {
                    warn!("Invalid header value for key '{}': {}", key, value);
                }
            },
            Err(_) => {
                warn!("Invalid header name: {}", key);
            }
        }
    }

    if let Some(protocols) = request.protocol_header() {
        let value = protocols
            .parse::<http::header::HeaderValue>()
            .map_err(|e| HyperSocketError::Configuration(e.to_string()))?;
        client_request
            .headers_mut()
            .insert(http::header::SEC_WEBSOCKET_PROTOCOL, value);
    }

    Ok(client_request)
}

/// Convert WsMessage to tungstenite Message
fn ws_message_to_tungstenite(msg: WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text),
        WsMessage::Binary(data) => Message::Binary(data),
    }
}

/// Convert tungstenite Message to WsMessage
fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_sets_protocol_and_headers() {
        let mut headers = Headers::new();
        headers.insert("Authorization", "Bearer token");
        headers.insert("Bad Header", "x");

        let request = ConnectRequest::new("ws://localhost:4000/graphql")
            .protocol("graphql-ws")
            .headers(headers);

        let built = build_request(&request).unwrap();
        assert_eq!(
            built.headers().get("sec-websocket-protocol").unwrap(),
            "graphql-ws"
        );
        assert_eq!(built.headers().get("authorization").unwrap(), "Bearer token");
        assert!(built.headers().get("bad header").is_none());
    }

    #[test]
    fn test_build_request_rejects_invalid_url() {
        let request = ConnectRequest::new("not a url");
        assert!(matches!(
            build_request(&request),
            Err(HyperSocketError::Configuration(_))
        ));
    }

    #[test]
    fn test_message_conversion() {
        assert_eq!(
            tungstenite_to_ws_message(Message::Text("hi".into())),
            Some(WsMessage::from("hi"))
        );
        assert_eq!(tungstenite_to_ws_message(Message::Ping(vec![1])), None);
        assert_eq!(
            ws_message_to_tungstenite(WsMessage::Binary(vec![1, 2])),
            Message::Binary(vec![1, 2])
        );
    }

    #[test]
    fn test_connect_without_runtime_reports_error() {
        let mut connection = WebSocketConnector::new().connect(ConnectRequest::new("ws://localhost:1"));
        assert!(matches!(
            connection.try_next_event(),
            Some(ConnectionEvent::Error(_))
        ));
        assert!(matches!(
            connection.try_next_event(),
            Some(ConnectionEvent::Close { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_refused_reports_error_then_close() {
        // Port 9 (discard) is not expected to be listening locally
        let mut connection =
            WebSocketConnector::new().connect(ConnectRequest::new("ws://127.0.0.1:9"));

        assert!(matches!(
            connection.next_event().await,
            Some(ConnectionEvent::Error(_))
        ));
        assert!(matches!(
            connection.next_event().await,
            Some(ConnectionEvent::Close { .. })
        ));
    }
}
