//! Shared test utilities for the bridge integration tests.
//!
//! Provides a `TestBridge` harness that runs the full bridge (reader, hub,
//! acceptor) against a scripted mock source on an ephemeral loopback port,
//! plus bounded read helpers so a broken bridge fails tests instead of
//! hanging them.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use serial_bridge::error::BridgeError;
use serial_bridge::port::MockLineSource;

/// Upper bound for every await in the suite.
pub const WAIT: Duration = Duration::from_secs(2);

/// Long enough for the hub to process registrations already in flight.
pub const SETTLE: Duration = Duration::from_millis(100);

/// A running bridge wired to a scripted serial source.
pub struct TestBridge {
    /// Handle the test uses to script records and failures.
    pub source: MockLineSource,
    /// The ephemeral loopback address clients connect to.
    pub addr: SocketAddr,
    /// Cancelling this token shuts the bridge down.
    pub shutdown: CancellationToken,
    /// The bridge task itself.
    pub handle: JoinHandle<Result<(), BridgeError>>,
}

impl TestBridge {
    /// Start a bridge with a fresh mock source on 127.0.0.1:0.
    pub async fn start() -> Self {
        let source = MockLineSource::new("MOCK0");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("listener address");
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(serial_bridge::run(
            source.clone(),
            listener,
            shutdown.clone(),
        ));
        Self {
            source,
            addr,
            shutdown,
            handle,
        }
    }

    /// Connect a client and give the hub time to register it.
    pub async fn connect(&self) -> TcpStream {
        let stream = timeout(WAIT, TcpStream::connect(self.addr))
            .await
            .expect("connect timed out")
            .expect("connect failed");
        tokio::time::sleep(SETTLE).await;
        stream
    }

    /// Cancel the bridge and wait for it to finish.
    pub async fn stop(self) -> Result<(), BridgeError> {
        self.shutdown.cancel();
        timeout(WAIT, self.handle)
            .await
            .expect("bridge did not stop in time")
            .expect("bridge task panicked")
    }
}

/// Read exactly `len` bytes from the client's socket, within the bound.
pub async fn read_exact(stream: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    timeout(WAIT, stream.read_exact(&mut buf))
        .await
        .expect("read timed out")
        .expect("read failed");
    buf
}

/// Read until the bridge closes the connection, returning any leftover bytes.
pub async fn read_to_eof(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    timeout(WAIT, stream.read_to_end(&mut buf))
        .await
        .expect("end of stream timed out")
        .expect("read failed");
    buf
}
