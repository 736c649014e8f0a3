//! A single WebSocket transport session.
//!
//! A [`Session`] owns one physical bidirectional connection to the
//! presentation server. It knows how to send a text frame and how to
//! surface inbound frames and connection loss -- nothing about the
//! protocol carried on top. A closed session is terminal: callers open
//! a fresh one instead of reviving it.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::Error;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a session surfaces to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A complete inbound text frame.
    Frame(String),
    /// The connection is gone (close frame, stream end, or read error).
    /// Terminal: no further frames will arrive.
    Closed(String),
}

/// One open WebSocket connection to the server.
///
/// Send and receive are independent directions with no ordering
/// constraint between them; consumers call [`split`](Self::split) and
/// drive the halves from different `select!` arms.
pub struct Session {
    sink: SessionSink,
    stream: SessionStream,
}

/// The outbound half of a session.
pub struct SessionSink {
    write: SplitSink<WsStream, Message>,
}

/// The inbound half of a session.
pub struct SessionStream {
    read: SplitStream<WsStream>,
}

impl Session {
    /// Open a connection to the given `ws://` / `wss://` endpoint.
    ///
    /// This is the only suspending operation in the session lifecycle;
    /// once open, the two directions never wait on each other.
    pub async fn open(url: &Url) -> Result<Self, Error> {
        tracing::debug!(url = %url, "opening WebSocket session");

        let uri: tungstenite::http::Uri = url.as_str().parse().map_err(
            |e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()),
        )?;

        let (ws_stream, _response) = connect_async(uri)
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        tracing::debug!("WebSocket session open");

        let (write, read) = ws_stream.split();
        Ok(Self {
            sink: SessionSink { write },
            stream: SessionStream { read },
        })
    }

    /// Separate the session into its outbound and inbound halves.
    pub fn split(self) -> (SessionSink, SessionStream) {
        (self.sink, self.stream)
    }
}

impl SessionSink {
    /// Send one text frame. Does not wait for any reply.
    pub async fn send_text(&mut self, frame: String) -> Result<(), Error> {
        self.write
            .send(Message::text(frame))
            .await
            .map_err(|e| Error::WebSocketSend(e.to_string()))
    }
}

impl SessionStream {
    /// Wait for the next session event.
    ///
    /// Non-text frames are handled internally: tungstenite answers
    /// protocol pings automatically, binary and pong frames are skipped.
    /// Once `Closed` has been returned the stream yields `Closed`
    /// forever.
    pub async fn next_event(&mut self) -> SessionEvent {
        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => {
                    return SessionEvent::Frame(text.as_str().to_owned());
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = match frame {
                        Some(cf) => format!("close frame (code {}): {}", cf.code, cf.reason),
                        None => "close frame".to_owned(),
                    };
                    tracing::debug!(%reason, "WebSocket closed by server");
                    return SessionEvent::Closed(reason);
                }
                Some(Ok(Message::Ping(_))) => {
                    // tungstenite queues the pong reply automatically
                    tracing::trace!("WebSocket ping");
                }
                Some(Ok(_)) => {
                    // Binary, Pong, raw frames -- not part of the protocol
                }
                Some(Err(e)) => {
                    return SessionEvent::Closed(format!("read error: {e}"));
                }
                None => {
                    return SessionEvent::Closed("stream ended".to_owned());
                }
            }
        }
    }
}
