//! Connection acceptance task.
//!
//! Owns the bound listener and forwards every accepted connection to the
//! hub. An individual accept failure is logged and survived; only
//! cancellation (or the hub going away) stops the loop, and dropping the
//! listener on exit releases the port.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Run the accept loop until cancellation or hub exit.
pub async fn run(
    listener: TcpListener,
    clients: mpsc::Sender<(TcpStream, SocketAddr)>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("acceptor stopping");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    if clients.send((stream, addr)).await.is_err() {
                        break;
                    }
                }
                Err(error) if shutdown.is_cancelled() => {
                    debug!(%error, "accept interrupted by shutdown");
                    break;
                }
                Err(error) => {
                    warn!(%error, "failed to accept connection");
                }
            },
        }
    }
}
