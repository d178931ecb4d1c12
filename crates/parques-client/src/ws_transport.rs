//! WebSocket transport for native targets, via `tokio-tungstenite`.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::transport::{Transport, TransportError, TransportReader, TransportWriter};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn io_error(err: impl std::fmt::Display) -> TransportError {
    TransportError::Failed(err.to_string())
}

/// WebSocket transport for native (non-WASM) targets. Accepts `ws://`
/// and `wss://` endpoints.
pub struct WsTransport {
    socket: WsStream,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (socket, _handshake) = connect_async(url).await.map_err(io_error)?;
        Ok(Self { socket })
    }
}

impl Transport for WsTransport {
    type Reader = WsReader;
    type Writer = WsWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        let (outbound, frames) = self.socket.split();
        (WsReader { frames }, WsWriter { outbound })
    }
}

pub struct WsReader {
    frames: SplitStream<WsStream>,
}

impl TransportReader for WsReader {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            let frame = match self.frames.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(err)) => return Err(io_error(err)),
                None => return Ok(None),
            };
            match frame {
                Message::Text(text) => return Ok(Some(text.to_string())),
                Message::Close(_) => return Ok(None),
                // Ping/pong/binary carry no game events.
                _ => {}
            }
        }
    }
}

pub struct WsWriter {
    outbound: SplitSink<WsStream, Message>,
}

impl TransportWriter for WsWriter {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.outbound.send(Message::text(text)).await.map_err(io_error)
    }
}
