//! Broadcast hub: the single owner of the live client set.
//!
//! The hub is the serialization point of the bridge. It consumes its event
//! sources one at a time (records from the serial reader, accepted
//! connections from the acceptor, and the shutdown token), so the client set
//! needs no locking: every mutation happens on this task.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One newline-terminated record from the serial device, delimiter included.
pub type Line = Vec<u8>;

/// Lifecycle of the hub's control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    /// Accepting registrations and broadcasting records.
    Running,
    /// Cancellation observed; closing registered clients.
    ShuttingDown,
    /// All clients closed and the loop has terminated.
    Stopped,
}

/// A registered client connection, owned by the hub until it is closed.
#[derive(Debug)]
struct ClientConn<W> {
    /// Peer address, for diagnostics.
    addr: SocketAddr,
    /// The writable stream broadcasts go to.
    sink: W,
}

/// Fan-out hub over any writable connection type.
///
/// Generic over the sink so the unit tests can drive it with in-memory
/// duplex pipes; the bridge instantiates it with `TcpStream`.
#[derive(Debug)]
pub struct Hub<W> {
    clients: HashMap<Uuid, ClientConn<W>>,
    state: HubState,
}

impl<W> Default for Hub<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Hub<W> {
    /// Create an empty hub in the `Running` state.
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            state: HubState::Running,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HubState {
        self.state
    }

    /// Number of live clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl<W> Hub<W>
where
    W: AsyncWrite + Unpin,
{
    /// Register a newly accepted connection.
    ///
    /// Connections are distinct by construction, so there is nothing to
    /// deduplicate; registration is unconditional.
    pub fn register(&mut self, sink: W, addr: SocketAddr) -> Uuid {
        let client_id = Uuid::new_v4();
        self.clients.insert(client_id, ClientConn { addr, sink });
        info!(client = %addr, clients = self.clients.len(), "client connected");
        client_id
    }

    /// Write one record to every live client.
    ///
    /// A failing client is logged, closed, and removed permanently; the rest
    /// of the round is unaffected. Removal happens after the full round so a
    /// failure never delays delivery to the others.
    pub async fn broadcast(&mut self, line: &[u8]) {
        let mut dead = Vec::new();
        for (client_id, client) in self.clients.iter_mut() {
            if let Err(error) = client.sink.write_all(line).await {
                warn!(client = %client.addr, %error, "write failed, dropping client");
                dead.push(*client_id);
            }
        }
        for client_id in dead {
            if let Some(mut client) = self.clients.remove(&client_id) {
                // Best effort: the peer is already gone on most write errors.
                let _ = client.sink.shutdown().await;
                info!(
                    client = %client.addr,
                    clients = self.clients.len(),
                    "client disconnected"
                );
            }
        }
    }

    /// Close every registered client and stop.
    ///
    /// Runs exactly once, when cancellation is observed. Close errors are
    /// logged and do not interrupt the sweep.
    pub async fn shutdown(&mut self) {
        self.state = HubState::ShuttingDown;
        info!(clients = self.clients.len(), "closing all client connections");
        for (_, mut client) in self.clients.drain() {
            if let Err(error) = client.sink.shutdown().await {
                warn!(client = %client.addr, %error, "error closing client connection");
            }
        }
        self.state = HubState::Stopped;
    }

    /// Drive the hub until cancellation.
    ///
    /// This is the single consumer of both producer channels. A producer
    /// going away (serial source failed, acceptor gone) only disables that
    /// event arm; the hub keeps serving the remaining sources until the
    /// token fires.
    pub async fn run(
        &mut self,
        mut lines: mpsc::Receiver<Line>,
        mut clients: mpsc::Receiver<(W, SocketAddr)>,
        shutdown: CancellationToken,
    ) {
        let mut lines_open = true;
        let mut clients_open = true;

        while self.state == HubState::Running {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.shutdown().await;
                }
                line = lines.recv(), if lines_open => match line {
                    Some(line) => self.broadcast(&line).await,
                    None => {
                        debug!("record channel closed, broadcasting stops");
                        lines_open = false;
                    }
                },
                conn = clients.recv(), if clients_open => match conn {
                    Some((sink, addr)) => {
                        self.register(sink, addr);
                    }
                    None => {
                        debug!("connection channel closed, registration stops");
                        clients_open = false;
                    }
                },
            }
        }
    }
}
