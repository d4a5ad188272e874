//! Serial Bridge Library
//!
//! Reads newline-terminated records from one serial device and broadcasts
//! each of them, unmodified, to every connected TCP client. Clients that go
//! away are dropped without disturbing the rest.
//!
//! # Modules
//!
//! - `port`: serial transport layer (real device, mock, framing settings)
//! - `reader`: serial ingestion task
//! - `acceptor`: TCP connection acceptance task
//! - `hub`: broadcast hub owning the live client set
//! - `bridge`: composition entry point wiring the tasks together
//! - `error`: bridge-level error handling

pub mod acceptor;
pub mod bridge;
pub mod error;
pub mod hub;
pub mod port;
pub mod reader;

// Re-export commonly used types for convenience
pub use bridge::run;
pub use error::BridgeError;
pub use hub::{Hub, HubState, Line};
pub use port::{
    DataBits, FlowControl, LineSource, MockLineSource, Parity, PortError, SerialLineSource,
    SerialSettings, StopBits,
};
