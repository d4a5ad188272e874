//! Serial source error types.
//!
//! Defines error types for serial device operations, separate from bridge-level
//! errors to maintain clean separation of concerns.

use thiserror::Error;

/// Errors that can occur while opening or reading the serial device.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial device was not found on the system.
    #[error("Serial device not found: {0}")]
    NotFound(String),

    /// An I/O error occurred while reading the device.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Device configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a device path.
    pub fn not_found(device: impl Into<String>) -> Self {
        Self::NotFound(device.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an Io error marking the end of the device's byte stream.
    ///
    /// A serial device has no orderly EOF, so running out of bytes is a
    /// failure of the source rather than a normal completion.
    pub fn end_of_stream(context: &str) -> Self {
        Self::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            context.to_string(),
        ))
    }
}
