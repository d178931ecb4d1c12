//! Channel-based network client for the game server.
//!
//! The socket is owned by two background loops; the controller only sees a
//! pair of channels. Server frames arrive parsed on `incoming`, intents go
//! out through [`NetClient::send`]. Dropping the [`NetClient`] closes the
//! intent channel, which ends the write loop and releases the socket.

use tokio::sync::mpsc;
use tracing::debug;

use parques_core::protocol::{ClientMessage, ServerMessage};

#[cfg(feature = "native")]
use crate::transport::{Transport, TransportReader, TransportWriter};

#[cfg(feature = "native")]
type EventSender = mpsc::UnboundedSender<ServerMessage>;
#[cfg(feature = "native")]
type IntentReceiver = mpsc::UnboundedReceiver<ClientMessage>;

// ---------------------------------------------------------------------------
// Wire-level encoding and decoding
// ---------------------------------------------------------------------------

/// Try to deserialize a raw text frame as a [`ServerMessage`].
///
/// Returns `None` for empty/whitespace-only input or unrecognised JSON.
pub fn parse_server_frame(frame: &str) -> Option<ServerMessage> {
    let trimmed = frame.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ServerMessage>(trimmed) {
        Ok(msg) => Some(msg),
        Err(err) => {
            debug!(%err, "dropping unrecognised server frame");
            None
        }
    }
}

/// Serialize an intent for the wire. `None` only if serde fails, which for
/// these types would be a bug; the intent is dropped with a log line rather
/// than tearing the connection down.
fn encode_intent(msg: &ClientMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(json),
        Err(err) => {
            debug!(%err, "dropping unencodable intent");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Background loops (native)
// ---------------------------------------------------------------------------

/// Pump frames off the transport into the event channel until the
/// connection ends or the controller goes away. Dropping `event_tx` on exit
/// is what tells the controller the connection is gone.
#[cfg(feature = "native")]
async fn read_loop<R: TransportReader>(mut reader: R, event_tx: EventSender) {
    loop {
        let frame = match reader.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                debug!(%err, "transport read failed");
                break;
            }
        };
        if let Some(msg) = parse_server_frame(&frame)
            && event_tx.send(msg).is_err()
        {
            break;
        }
    }
}

/// Drain queued intents onto the transport. Ends when the controller drops
/// its `NetClient` (channel closes) or the write half fails.
#[cfg(feature = "native")]
async fn write_loop<W: TransportWriter>(mut writer: W, mut intent_rx: IntentReceiver) {
    while let Some(msg) = intent_rx.recv().await {
        let Some(json) = encode_intent(&msg) else {
            continue;
        };
        if let Err(err) = writer.send(&json).await {
            debug!(%err, "transport write failed");
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// NetClient
// ---------------------------------------------------------------------------

/// A channel-based network client for the game server.
///
/// Construct with [`NetClient::from_transport`] (generic), or use the
/// convenience method [`connect_ws`](NetClient::connect_ws) (WebSocket).
///
/// The client exposes:
/// - [`incoming`](NetClient::incoming) — an [`mpsc::UnboundedReceiver<ServerMessage>`]
///   for server events. The channel closing signals disconnection.
/// - [`send`](NetClient::send) — a non-async, non-blocking method to enqueue
///   a [`ClientMessage`] for transmission.
pub struct NetClient {
    /// Receive parsed server events. Channel close = disconnected.
    pub incoming: mpsc::UnboundedReceiver<ServerMessage>,
    /// Send-side of the write loop's channel (kept for [`Self::send`]).
    intents: mpsc::UnboundedSender<ClientMessage>,
}

impl NetClient {
    /// Create a `NetClient` over any [`Transport`] implementation.
    ///
    /// Splits the transport into read/write halves and spawns the two
    /// background loops. No handshake is sent — the caller sends `joinGame`
    /// (or `createGame`) afterwards.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        let (reader, writer) = transport.split();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();

        tokio::spawn(read_loop(reader, event_tx));
        tokio::spawn(write_loop(writer, intent_rx));

        Self {
            incoming: event_rx,
            intents: intent_tx,
        }
    }

    /// Connect to a WebSocket server and spawn the background loops.
    #[cfg(feature = "native")]
    pub async fn connect_ws(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = crate::ws_transport::WsTransport::connect(url).await?;
        Ok(Self::from_transport(transport))
    }

    /// Connect to a WebSocket server from a WASM environment.
    ///
    /// `gloo-net` sockets are not `Send`, so the loops run inline here and
    /// go through `wasm_bindgen_futures::spawn_local` instead of
    /// `tokio::spawn`.
    #[cfg(all(feature = "web", not(feature = "native")))]
    pub async fn connect_ws(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        use futures_util::{SinkExt, StreamExt};
        use gloo_net::websocket::{Message, futures::WebSocket};

        let ws = WebSocket::open(url).map_err(|e| format!("WebSocket connect failed: {e}"))?;
        let (mut sink, mut stream) = ws.split();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (intent_tx, mut intent_rx) = mpsc::unbounded_channel::<ClientMessage>();

        wasm_bindgen_futures::spawn_local(async move {
            loop {
                let text = match stream.next().await {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Bytes(_))) => continue,
                    Some(Err(_)) | None => break,
                };
                if let Some(msg) = parse_server_frame(&text)
                    && event_tx.send(msg).is_err()
                {
                    break;
                }
            }
        });

        wasm_bindgen_futures::spawn_local(async move {
            while let Some(msg) = intent_rx.recv().await {
                let Some(json) = encode_intent(&msg) else {
                    continue;
                };
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            incoming: event_rx,
            intents: intent_tx,
        })
    }

    /// Enqueue a [`ClientMessage`] for transmission to the server.
    ///
    /// Non-blocking — the message goes onto a channel and the write loop
    /// handles the actual I/O.
    pub fn send(&self, msg: ClientMessage) -> Result<(), mpsc::error::SendError<ClientMessage>> {
        self.intents.send(msg)
    }
}
