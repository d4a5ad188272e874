//! Mock line source for testing.
//!
//! Provides a `MockLineSource` that simulates a serial device without
//! requiring actual hardware. Tests script the records and failures the
//! source will yield, in order, and may append more while the bridge runs.

use super::error::PortError;
use super::traits::LineSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// One scripted outcome of a `next_line` call.
#[derive(Debug)]
enum Scripted {
    /// Yield this record.
    Line(Vec<u8>),
    /// Fail the read with this I/O error.
    Error(std::io::ErrorKind, String),
}

/// Inner state of the mock, shared between the reading task and the test
/// that drives it.
#[derive(Debug, Default)]
struct MockSourceState {
    /// Outcomes returned by `next_line`, in order.
    script: VecDeque<Scripted>,
    /// Once set, reads fail after the script drains, like an unplugged device.
    closed: bool,
}

/// Mock `LineSource` with a scriptable record stream.
///
/// The mock is cheaply clonable; the bridge's reader task owns one clone
/// while the test keeps another to push records mid-run. A read with nothing
/// scripted waits, exactly like a quiet device.
///
/// # Example
/// ```
/// use serial_bridge::port::{LineSource, MockLineSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut source = MockLineSource::new("MOCK0");
/// source.push_line(b"hello\n");
///
/// let line = source.next_line().await.unwrap();
/// assert_eq!(line, b"hello\n");
/// # }
/// ```
#[derive(Clone)]
pub struct MockLineSource {
    /// The device name/identifier.
    name: String,
    /// The internal state, shared across clones.
    state: Arc<Mutex<MockSourceState>>,
    /// Wakes a read that is waiting for the script to grow.
    wakeup: Arc<Notify>,
}

impl MockLineSource {
    /// Create a new mock source with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockSourceState::default())),
            wakeup: Arc::new(Notify::new()),
        }
    }

    /// Script a record to be yielded by a subsequent `next_line` call.
    pub fn push_line(&self, line: &[u8]) {
        self.state
            .lock()
            .script
            .push_back(Scripted::Line(line.to_vec()));
        self.wakeup.notify_one();
    }

    /// Script a read failure.
    pub fn push_error(&self, kind: std::io::ErrorKind, message: &str) {
        self.state
            .lock()
            .script
            .push_back(Scripted::Error(kind, message.to_string()));
        self.wakeup.notify_one();
    }

    /// End the stream: once the script drains, reads fail permanently.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.wakeup.notify_one();
    }

    /// Number of scripted outcomes not yet consumed.
    pub fn pending(&self) -> usize {
        self.state.lock().script.len()
    }
}

#[async_trait]
impl LineSource for MockLineSource {
    async fn next_line(&mut self) -> Result<Vec<u8>, PortError> {
        loop {
            {
                let mut state = self.state.lock();
                if let Some(next) = state.script.pop_front() {
                    return match next {
                        Scripted::Line(line) => Ok(line),
                        Scripted::Error(kind, message) => {
                            Err(PortError::Io(std::io::Error::new(kind, message)))
                        }
                    };
                }
                if state.closed {
                    return Err(PortError::end_of_stream("mock serial stream closed"));
                }
            }
            // A push between the check above and this await leaves a stored
            // permit, so the wakeup cannot be lost.
            self.wakeup.notified().await;
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockLineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLineSource")
            .field("name", &self.name)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_scripted_lines_come_out_in_order() {
        let mut source = MockLineSource::new("MOCK0");
        source.push_line(b"one\n");
        source.push_line(b"two\n");

        assert_eq!(source.next_line().await.unwrap(), b"one\n");
        assert_eq!(source.next_line().await.unwrap(), b"two\n");
        assert_eq!(source.pending(), 0);
    }

    #[tokio::test]
    async fn test_scripted_error_surfaces_as_io_failure() {
        let mut source = MockLineSource::new("MOCK0");
        source.push_error(std::io::ErrorKind::TimedOut, "no response");

        match source.next_line().await {
            Err(PortError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::TimedOut),
            other => panic!("Expected I/O error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_drains_the_script_then_fails() {
        let mut source = MockLineSource::new("MOCK0");
        source.push_line(b"buffered\n");
        source.close();

        // Records scripted before the close still come out.
        assert_eq!(source.next_line().await.unwrap(), b"buffered\n");

        match source.next_line().await {
            Err(PortError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("Expected UnexpectedEof, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_releases_a_pending_read() {
        let source = MockLineSource::new("MOCK0");
        let mut reading = source.clone();
        let pending = tokio::spawn(async move { reading.next_line().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        source.close();

        let result = timeout(Duration::from_secs(2), pending)
            .await
            .expect("read did not resolve")
            .expect("read task panicked");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_next_line_waits_for_the_script() {
        let source = MockLineSource::new("MOCK0");
        let mut reading = source.clone();
        let pending = tokio::spawn(async move { reading.next_line().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        source.push_line(b"late\n");

        let line = timeout(Duration::from_secs(2), pending)
            .await
            .expect("read did not resolve")
            .expect("read task panicked")
            .unwrap();
        assert_eq!(line, b"late\n");
    }

    #[test]
    fn test_clones_share_the_script() {
        let source = MockLineSource::new("MOCK0");
        let clone = source.clone();
        clone.push_line(b"shared\n");

        assert_eq!(source.pending(), 1);
    }
}
