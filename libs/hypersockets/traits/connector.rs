use crate::core::config::ConnectRequest;
use crate::core::connection::Connection;

/// Factory for persistent connections
///
/// `connect` must return immediately. The outcome of the handshake is
/// reported through the connection's event stream: `Open` once the far end
/// accepted, or `Error` followed by `Close` when it did not.
///
/// Implement this trait to plug in a different transport, or to hand out
/// in-memory connections from tests:
///
/// ```ignore
/// struct FakeConnector {
///     peers: Mutex<Vec<ConnectionPeer>>,
/// }
///
/// impl Connector for FakeConnector {
///     fn connect(&self, _request: ConnectRequest) -> Connection {
///         let (connection, peer) = Connection::channel();
///         self.peers.lock().push(peer);
///         connection
///     }
/// }
/// ```
pub trait Connector: Send + Sync {
    /// Open a connection described by `request`
    fn connect(&self, request: ConnectRequest) -> Connection;
}
