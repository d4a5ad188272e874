//! Serial ingestion task.
//!
//! Owns the opened line source and forwards every delimited record to the
//! hub, in read order, until cancellation or a source failure. Dropping the
//! source on exit releases the device on every path.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::hub::Line;
use crate::port::LineSource;

/// Run the serial reader until cancellation, a source failure, or hub exit.
///
/// A source failure ends ingestion but not the bridge: the channel sender is
/// dropped here and the hub carries on serving already-connected clients.
pub async fn run<S>(mut source: S, lines: mpsc::Sender<Line>, shutdown: CancellationToken)
where
    S: LineSource,
{
    let device = source.name().to_string();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(%device, "serial reader stopping");
                break;
            }
            next = source.next_line() => match next {
                Ok(line) => {
                    if lines.send(line).await.is_err() {
                        // Hub is gone; only happens once shutdown has begun.
                        break;
                    }
                }
                Err(error) if shutdown.is_cancelled() => {
                    debug!(%device, %error, "serial read interrupted by shutdown");
                    break;
                }
                Err(error) => {
                    error!(%device, %error, "serial read failed, stopping ingestion");
                    break;
                }
            },
        }
    }
}
