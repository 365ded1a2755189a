//! Connection contract used by the pumps.
//!
//! A connection is split into a reader half owned by the inbound pump and a
//! writer half owned by the outbound pump. Both pumps share a
//! [`ConnectionCloser`]; closing it makes the other pump give up on its next
//! wait, and the transport is released once both halves are dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use super::error::ConnectionError;

/// One message-level frame on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// Reading half of a connection.
#[async_trait]
pub trait FrameReader: Send + 'static {
    /// Read the next frame.
    ///
    /// A connection that has been closed by the peer yields
    /// [`ConnectionError::Closed`]. Any error is terminal.
    async fn read_frame(&mut self) -> Result<Frame, ConnectionError>;
}

/// Writing half of a connection.
#[async_trait]
pub trait FrameWriter: Send + 'static {
    /// Write one frame. Any error is terminal.
    async fn write_frame(&mut self, frame: Frame) -> Result<(), ConnectionError>;
}

/// A full-duplex, message-oriented connection.
pub trait Connection: Send + 'static {
    type Reader: FrameReader;
    type Writer: FrameWriter;

    fn split(self) -> (Self::Reader, Self::Writer);
}

/// Close signal shared by the two pumps of one connection.
///
/// The first call to [`close`](Self::close) wins; later calls are no-ops.
#[derive(Debug, Clone)]
pub struct ConnectionCloser {
    state: Arc<watch::Sender<bool>>,
}

impl ConnectionCloser {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Close the connection. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        !self.state.send_replace(true)
    }

    pub fn is_closed(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolve once the connection has been closed.
    pub async fn closed(&self) {
        let mut state = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns once closed.
        let _ = state.wait_for(|closed| *closed).await;
    }
}

impl Default for ConnectionCloser {
    fn default() -> Self {
        Self::new()
    }
}
