// ── Runtime connection configuration ──
//
// These types describe *how* to reach a presentation server. They are
// constructed by the embedding front-end, validated once when the engine
// is built, and immutable for the lifetime of the session.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Reconnection policy for the supervisor.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on the backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum automatic reconnection attempts before giving up.
    /// `None` means retry forever. `Some(0)` is rejected at validation:
    /// unlimited retries must be spelled explicitly as `None`.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: Some(10),
        }
    }
}

/// Configuration for one engine instance.
///
/// Built by the front-end, passed to `Engine::new` -- the core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HTTP base URL for talk metadata and slide content
    /// (e.g. `http://localhost:8080`).
    pub api_url: Url,

    /// WebSocket endpoint for the notification channel
    /// (e.g. `ws://localhost:8080/api/ws`).
    pub ws_url: Url,

    /// Opaque client identifier, unique per session. Sent in the
    /// `Register` frame; the server knows this client by nothing else.
    pub client_id: String,

    /// Reconnection policy.
    pub reconnect: ReconnectPolicy,

    /// How often the latency probe pings while connected.
    pub ping_interval: Duration,

    /// Timeout for slide/talk HTTP fetches.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Build a config for a server at `base`, deriving the WebSocket
    /// endpoint from the HTTP base URL (`/api/ws`, `ws`/`wss` scheme).
    pub fn for_server(base: Url, client_id: impl Into<String>) -> Result<Self, CoreError> {
        let ws_scheme = match base.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(CoreError::Config {
                    message: format!("unsupported server URL scheme: {other}"),
                });
            }
        };

        let mut ws_url = base.join("api/ws").map_err(|e| CoreError::Config {
            message: format!("cannot derive WebSocket URL: {e}"),
        })?;
        ws_url
            .set_scheme(ws_scheme)
            .map_err(|()| CoreError::Config {
                message: "cannot derive WebSocket URL scheme".into(),
            })?;

        Ok(Self {
            api_url: base,
            ws_url,
            client_id: client_id.into(),
            reconnect: ReconnectPolicy::default(),
            ping_interval: Duration::from_secs(10),
            http_timeout: Duration::from_secs(30),
        })
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.client_id.is_empty() {
            return Err(CoreError::Config {
                message: "client_id must not be empty".into(),
            });
        }
        if self.reconnect.max_attempts == Some(0) {
            return Err(CoreError::Config {
                message: "max_attempts = 0 is ambiguous; use None for unlimited retries".into(),
            });
        }
        if self.reconnect.initial_delay.is_zero() {
            return Err(CoreError::Config {
                message: "initial reconnect delay must be positive".into(),
            });
        }
        if self.reconnect.max_delay < self.reconnect.initial_delay {
            return Err(CoreError::Config {
                message: "max reconnect delay must be >= the initial delay".into(),
            });
        }
        if self.ping_interval.is_zero() {
            return Err(CoreError::Config {
                message: "ping interval must be positive".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        "http://localhost:8080".parse().unwrap()
    }

    #[test]
    fn for_server_derives_ws_url() {
        let config = ClientConfig::for_server(base(), "tui-1").unwrap();
        assert_eq!(config.ws_url.as_str(), "ws://localhost:8080/api/ws");
        assert_eq!(config.client_id, "tui-1");
        config.validate().unwrap();
    }

    #[test]
    fn for_server_https_becomes_wss() {
        let config =
            ClientConfig::for_server("https://podium.example".parse().unwrap(), "c").unwrap();
        assert_eq!(config.ws_url.scheme(), "wss");
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let mut config = ClientConfig::for_server(base(), "c").unwrap();
        config.reconnect.max_attempts = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn unlimited_retries_are_spelled_none() {
        let mut config = ClientConfig::for_server(base(), "c").unwrap();
        config.reconnect.max_attempts = None;
        config.validate().unwrap();
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let config = ClientConfig::for_server(base(), "").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_delays_are_rejected() {
        let mut config = ClientConfig::for_server(base(), "c").unwrap();
        config.reconnect.initial_delay = Duration::from_secs(60);
        config.reconnect.max_delay = Duration::from_secs(30);
        assert!(config.validate().is_err());
    }
}
