//! Bridge composition: wires the reader, acceptor, and hub together.
//!
//! `run` is the library entry point. `main` hands it an opened serial source
//! and a bound listener; the integration tests hand it a mock source and an
//! ephemeral listener. It returns once the hub has stopped and both producer
//! tasks have wound down.

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::acceptor;
use crate::error::BridgeError;
use crate::hub::Hub;
use crate::port::LineSource;
use crate::reader;

/// Reader-to-hub queue depth. At most one record is held outside the device,
/// so the reader never runs ahead of what the hub has delivered.
const LINE_QUEUE_DEPTH: usize = 1;

/// Acceptor-to-hub queue depth. Acceptance order is preserved either way;
/// the queue only absorbs a burst of simultaneous connects.
const CLIENT_QUEUE_DEPTH: usize = 16;

/// Run the bridge until the shutdown token fires.
///
/// The reader and acceptor run as independent tasks feeding the hub, which
/// runs here. Either producer may die early (device failure) without taking
/// the bridge down; only the token ends the run.
pub async fn run<S>(
    source: S,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> Result<(), BridgeError>
where
    S: LineSource + 'static,
{
    let (line_tx, line_rx) = mpsc::channel(LINE_QUEUE_DEPTH);
    let (client_tx, client_rx) = mpsc::channel(CLIENT_QUEUE_DEPTH);

    let reader_task = tokio::spawn(reader::run(source, line_tx, shutdown.clone()));
    let acceptor_task = tokio::spawn(acceptor::run(listener, client_tx, shutdown.clone()));

    let mut hub = Hub::new();
    hub.run(line_rx, client_rx, shutdown).await;

    reader_task.await?;
    acceptor_task.await?;
    Ok(())
}
