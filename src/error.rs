//! Bridge-level error types.
//!
//! Everything here ends the whole process: startup failures (device,
//! listener) and task wiring failures. Per-connection problems are handled
//! and logged where they happen and never surface as a `BridgeError`.

use std::net::SocketAddr;
use thiserror::Error;

use crate::port::PortError;

/// Errors that terminate the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The serial device could not be opened or read.
    #[error("Serial device error: {0}")]
    Port(#[from] PortError),

    /// The TCP listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A bridge task terminated abnormally.
    #[error("Task failure: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl BridgeError {
    /// Create a Bind error for the given listen address.
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }
}
