//! The seam between the controller and whatever carries its frames.
//!
//! Everything on the wire is a JSON text frame; a transport moves those
//! frames verbatim and knows nothing about the game. Keeping the seam a
//! trait lets the controller run over a real WebSocket in the app and
//! over plain channels in the tests.

use std::future::Future;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The server closed the connection.
    #[error("transport closed")]
    Closed,

    /// The connection failed mid-flight (I/O or protocol error).
    #[error("transport failed: {0}")]
    Failed(String),
}

/// Read half: delivers inbound text frames.
pub trait TransportReader: Send + 'static {
    /// Receive the next frame. `Ok(None)` means a clean close; after that
    /// the reader must not be polled again.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, TransportError>> + Send;
}

/// Write half: carries outbound text frames.
pub trait TransportWriter: Send + 'static {
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A bidirectional transport, split into halves so reading and writing
/// can proceed concurrently from separate tasks.
pub trait Transport: Send + 'static {
    type Reader: TransportReader;
    type Writer: TransportWriter;

    fn split(self) -> (Self::Reader, Self::Writer);
}
