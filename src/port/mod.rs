//! Serial transport layer.
//!
//! Provides the line-oriented source abstraction over the serial device,
//! enabling dependency injection and testing via mocks.

pub mod error;
pub mod mock;
pub mod serial;
pub mod traits;

pub use error::PortError;
pub use mock::MockLineSource;
pub use serial::SerialLineSource;
pub use traits::*;
