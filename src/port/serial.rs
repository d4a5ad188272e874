//! Serial device line source backed by tokio-serial.
//!
//! Opens the device with the configured framing and yields newline-delimited
//! records through the `LineSource` trait. This is the production source; the
//! test suites use `MockLineSource` instead.

use super::error::PortError;
use super::traits::{LineSource, SerialSettings};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Line-oriented reader over an async serial stream.
pub struct SerialLineSource {
    /// Buffered reader wrapping the underlying tokio-serial stream.
    reader: BufReader<tokio_serial::SerialStream>,
    /// Device path for identification.
    name: String,
}

impl SerialLineSource {
    /// Open a serial device and prepare it for line-oriented reading.
    ///
    /// # Example
    /// ```no_run
    /// use serial_bridge::port::{SerialLineSource, SerialSettings};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut settings = SerialSettings::default();
    /// settings.baud_rate = 9600;
    /// let source = SerialLineSource::open("/dev/ttyUSB0", &settings)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(device: &str, settings: &SerialSettings) -> Result<Self, PortError> {
        let builder = tokio_serial::new(device, settings.baud_rate)
            .data_bits(settings.data_bits.into())
            .flow_control(settings.flow_control.into())
            .parity(settings.parity.into())
            .stop_bits(settings.stop_bits.into());

        let stream =
            tokio_serial::SerialStream::open(&builder).map_err(|e| open_error(device, e))?;

        Ok(Self {
            reader: BufReader::new(stream),
            name: device.to_string(),
        })
    }
}

#[async_trait]
impl LineSource for SerialLineSource {
    async fn next_line(&mut self) -> Result<Vec<u8>, PortError> {
        read_delimited(&mut self.reader).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SerialLineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLineSource")
            .field("name", &self.name)
            .finish()
    }
}

/// Classify a failed device open into a `PortError`.
fn open_error(device: &str, error: tokio_serial::Error) -> PortError {
    match error.kind() {
        tokio_serial::ErrorKind::NoDevice => PortError::not_found(device),
        tokio_serial::ErrorKind::InvalidInput => PortError::config(error.to_string()),
        // On Linux a missing device path comes back as a plain Io error,
        // never NoDevice.
        _ if !Path::new(device).exists() => PortError::not_found(device),
        _ => PortError::Serial(error),
    }
}

/// Read one newline-terminated record from `reader`, delimiter included.
///
/// End of stream is an error, and a trailing fragment with no delimiter is
/// discarded rather than forwarded as a record.
async fn read_delimited<R>(reader: &mut R) -> Result<Vec<u8>, PortError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Err(PortError::end_of_stream("serial stream ended"));
    }
    if line.last() != Some(&b'\n') {
        return Err(PortError::end_of_stream("serial stream ended mid-record"));
    }
    Ok(line)
}
