// Slides HTTP client
//
// Read-only access to the server's talk metadata and slide content.
// Raw wire shapes live here; podium-core converts them to domain types.
// The client never retries -- callers own their retry policy.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Talk metadata as the server serves it (`GET /api/talk`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkInfoResponse {
    pub title: String,
    pub date: String,
    /// Slide ids in presentation order.
    pub slide_ids: Vec<String>,
}

/// A single slide as the server serves it (`GET /api/slides/{id}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideResponse {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub style: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// HTTP client for the slides side of the protocol.
///
/// Slide content is immutable for the lifetime of a talk, so callers
/// cache responses keyed by slide id and only come back here on a miss.
#[derive(Debug, Clone)]
pub struct SlideClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SlideClient {
    /// Create a new client from a [`TransportConfig`].
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the talk metadata (title, date, ordered slide ids).
    ///
    /// `GET /api/talk`
    pub async fn talk_info(&self) -> Result<TalkInfoResponse, Error> {
        debug!("fetching talk metadata");
        self.get("api/talk").await
    }

    /// Fetch one slide by id.
    ///
    /// `GET /api/slides/{id}`
    pub async fn slide(&self, id: &str) -> Result<SlideResponse, Error> {
        debug!(slide = id, "fetching slide");
        self.get(&format!("api/slides/{id}")).await
    }

    // ── Request plumbing ─────────────────────────────────────────────

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
