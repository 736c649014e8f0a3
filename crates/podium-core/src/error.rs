// ── Core error types ──
//
// User-facing errors from podium-core. Consumers never see raw HTTP or
// WebSocket library errors; the `From<podium_api::Error>` impl translates
// wire-layer failures into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Channel could not be opened: {message}")]
    Connection { message: String },

    #[error("Not connected to a presentation server")]
    NotConnected,

    #[error("Reconnection limit reached after {attempts} attempts")]
    MaxRetriesReached { attempts: u32 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    #[error("Malformed frame: {message}")]
    Decode { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from wire-layer errors ────────────────────────────────

impl From<podium_api::Error> for CoreError {
    fn from(err: podium_api::Error) -> Self {
        match err {
            podium_api::Error::WebSocketConnect(reason) => CoreError::Connection {
                message: format!("WebSocket connection failed: {reason}"),
            },
            podium_api::Error::WebSocketSend(reason) => CoreError::Connection {
                message: format!("WebSocket send failed: {reason}"),
            },
            podium_api::Error::Transport(e) => CoreError::Fetch {
                message: e.to_string(),
            },
            podium_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            podium_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}
