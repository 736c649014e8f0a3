// ── Presentation run state ──

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slide::SlideId;

/// Server-authoritative run state of the presentation.
///
/// A closed sum: every variant carries the active slide and the elapsed
/// presentation time, only the phase tag differs. `total_duration` is
/// monotonically non-decreasing while `Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationState {
    Running {
        current: SlideId,
        total_duration: Duration,
    },
    Paused {
        current: SlideId,
        total_duration: Duration,
    },
    Done {
        current: SlideId,
        total_duration: Duration,
    },
}

impl PresentationState {
    /// The slide the server says is active.
    pub fn current(&self) -> &SlideId {
        match self {
            Self::Running { current, .. }
            | Self::Paused { current, .. }
            | Self::Done { current, .. } => current,
        }
    }

    /// Elapsed presentation time as reported by the server.
    pub fn total_duration(&self) -> Duration {
        match self {
            Self::Running { total_duration, .. }
            | Self::Paused { total_duration, .. }
            | Self::Done { total_duration, .. } => *total_duration,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// One round-trip measurement from the latency probe.
///
/// Owned by the probe while in flight; published to observers on each
/// matching pong. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySample {
    pub round_trip: Duration,
    pub taken_at: DateTime<Utc>,
}
