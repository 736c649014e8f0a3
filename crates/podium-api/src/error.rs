use thiserror::Error;

/// Top-level error type for the `podium-api` crate.
///
/// Covers every failure mode of the wire layer: HTTP transport,
/// WebSocket lifecycle, and payload decoding. `podium-core` maps
/// these into its own user-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, bad status).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket channel could not be opened.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// A frame could not be written to an open WebSocket.
    #[error("WebSocket send failed: {0}")]
    WebSocketSend(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error implies the channel itself is gone
    /// and a reconnect is the appropriate recovery.
    pub fn is_connection_loss(&self) -> bool {
        match self {
            Self::WebSocketConnect(_) | Self::WebSocketSend(_) => true,
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" HTTP error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Transport(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND))
    }
}
