//! Connection over an axum WebSocket.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{Connection, ConnectionError, Frame, FrameReader, FrameWriter};

/// An upgraded WebSocket.
///
/// The size limit is configured on the upgrade (`WebSocketUpgrade::max_message_size`);
/// the inbound pump enforces it again on every data frame.
pub struct WebSocketConnection {
    socket: WebSocket,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Connection for WebSocketConnection {
    type Reader = WebSocketReader;
    type Writer = WebSocketWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        let (sink, stream) = self.socket.split();
        (WebSocketReader { stream }, WebSocketWriter { sink })
    }
}

pub struct WebSocketReader {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameReader for WebSocketReader {
    async fn read_frame(&mut self) -> Result<Frame, ConnectionError> {
        match self.stream.next().await {
            Some(Ok(message)) => Ok(message.into()),
            Some(Err(e)) => Err(ConnectionError::Transport(e.to_string())),
            None => Err(ConnectionError::Closed),
        }
    }
}

pub struct WebSocketWriter {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl FrameWriter for WebSocketWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        self.sink
            .send(frame.into())
            .await
            .map_err(|e| ConnectionError::Transport(e.to_string()))
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Frame::Text(text.as_str().to_owned()),
            Message::Binary(data) => Frame::Binary(data.to_vec()),
            Message::Ping(data) => Frame::Ping(data.to_vec()),
            Message::Pong(data) => Frame::Pong(data.to_vec()),
            Message::Close(_) => Frame::Close,
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
            Frame::Ping(data) => Message::Ping(data.into()),
            Frame::Pong(data) => Message::Pong(data.into()),
            Frame::Close => Message::Close(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_to_frame() {
        // テスト項目: axum の Message がフレームに変換される
        // given (前提条件):
        let text = Message::Text("hello".into());
        let pong = Message::Pong(vec![1, 2].into());
        let close = Message::Close(None);

        // when (操作):
        let frames: Vec<Frame> = [text, pong, close].into_iter().map(Frame::from).collect();

        // then (期待する結果):
        assert_eq!(
            frames,
            vec![
                Frame::Text("hello".to_string()),
                Frame::Pong(vec![1, 2]),
                Frame::Close
            ]
        );
    }

    #[test]
    fn test_frame_to_message() {
        // テスト項目: フレームが axum の Message に変換される
        // given (前提条件):
        let ping = Frame::Ping(Vec::new());
        let close = Frame::Close;

        // when (操作):
        let ping_msg = Message::from(ping);
        let close_msg = Message::from(close);

        // then (期待する結果):
        assert!(matches!(ping_msg, Message::Ping(data) if data.is_empty()));
        assert!(matches!(close_msg, Message::Close(None)));
    }
}
