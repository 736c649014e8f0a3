// ── Slide and talk domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque slide identifier, stable for the lifetime of a talk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(String);

impl SlideId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlideId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SlideId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideKind {
    Cover,
    Part,
    #[default]
    Standard,
}

/// One slide of the active talk. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub title: String,
    pub body: String,
    pub kind: SlideKind,
    pub style: Vec<String>,
    pub notes: Option<String>,
}

/// Talk metadata: title, date, and the authoritative slide order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkInfo {
    pub title: String,
    pub date: String,
    pub slide_ids: Vec<SlideId>,
}

/// Display-facing position of a slide within the talk sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePosition {
    /// 1-based index within the ordered sequence.
    pub index: usize,
    /// Total number of slides in the talk.
    pub total: usize,
}

impl fmt::Display for SlidePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.total)
    }
}
