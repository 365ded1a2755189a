//! In-memory connection backed by tokio channels.
//!
//! The server side is a [`MemoryConnection`]; the test (or embedding code)
//! drives the other end through a [`MemoryPeer`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Connection, ConnectionError, Frame, FrameReader, FrameWriter};

/// Default number of frames the server may write before the peer reads
pub const DEFAULT_WRITE_CAPACITY: usize = 64;

/// Create a connected pair. Writes from the server block once
/// `write_capacity` frames are waiting for the peer.
pub fn memory_pair(write_capacity: usize) -> (MemoryConnection, MemoryPeer) {
    let (to_server, incoming) = mpsc::unbounded_channel();
    let (outgoing, from_server) = mpsc::channel(write_capacity);
    (
        MemoryConnection { incoming, outgoing },
        MemoryPeer {
            to_server,
            from_server,
        },
    )
}

/// Server side of an in-memory connection
pub struct MemoryConnection {
    incoming: mpsc::UnboundedReceiver<Result<Frame, ConnectionError>>,
    outgoing: mpsc::Sender<Frame>,
}

impl Connection for MemoryConnection {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        (
            MemoryReader {
                incoming: self.incoming,
            },
            MemoryWriter {
                outgoing: self.outgoing,
            },
        )
    }
}

pub struct MemoryReader {
    incoming: mpsc::UnboundedReceiver<Result<Frame, ConnectionError>>,
}

#[async_trait]
impl FrameReader for MemoryReader {
    async fn read_frame(&mut self) -> Result<Frame, ConnectionError> {
        self.incoming.recv().await.unwrap_or(Err(ConnectionError::Closed))
    }
}

pub struct MemoryWriter {
    outgoing: mpsc::Sender<Frame>,
}

#[async_trait]
impl FrameWriter for MemoryWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        self.outgoing
            .send(frame)
            .await
            .map_err(|_| ConnectionError::Closed)
    }
}

/// Remote end of a [`MemoryConnection`].
///
/// Dropping the peer closes the connection in both directions.
pub struct MemoryPeer {
    to_server: mpsc::UnboundedSender<Result<Frame, ConnectionError>>,
    from_server: mpsc::Receiver<Frame>,
}

impl MemoryPeer {
    /// Send `{"content": ...}` as a text frame.
    pub fn send_content(&self, content: &str) -> bool {
        let json = serde_json::json!({ "content": content }).to_string();
        self.send(Frame::Text(json))
    }

    pub fn send(&self, frame: Frame) -> bool {
        self.to_server.send(Ok(frame)).is_ok()
    }

    /// Make the server's next read fail with `error`.
    pub fn fail(&self, error: ConnectionError) -> bool {
        self.to_server.send(Err(error)).is_ok()
    }

    /// Next frame written by the server, `None` once the server side is gone.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.from_server.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Frame> {
        self.from_server.try_recv().ok()
    }
}
