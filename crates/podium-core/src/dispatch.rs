// ── Notification dispatch and state reconciliation ──
//
// One `SessionContext` exists per connection and is owned by the
// supervisor's connected loop -- the single logical worker. All writes
// to the presentation observers go through it, so notifications apply
// strictly in arrival order and no locking is needed.
//
// Slide fetches are the one asynchronous edge: the context only *requests*
// a fetch (returning the id to the caller, which spawns it); the result is
// re-queued onto the worker and applied through `apply_fetch`, where a
// completion whose slide id no longer matches the current state is
// discarded instead of overwriting newer state.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::SlideCache;
use crate::engine::EngineShared;
use crate::error::CoreError;
use crate::model::{PresentationState, Slide, SlideId, TalkInfo};
use crate::probe::LatencyProbe;
use crate::wire::Notification;

/// A completed slide fetch, re-queued onto the dispatch worker.
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    pub(crate) id: SlideId,
    pub(crate) result: Result<Slide, CoreError>,
}

/// Per-connection dispatch state: the slide cache, the latency probe,
/// and the set of slide ids with a fetch in flight.
pub(crate) struct SessionContext {
    cache: SlideCache,
    probe: LatencyProbe,
    in_flight: HashSet<SlideId>,
}

impl SessionContext {
    pub(crate) fn new() -> Self {
        Self {
            cache: SlideCache::new(),
            probe: LatencyProbe::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Forget everything tied to a dead channel: cached slides, the
    /// talk sequence, in-flight fetch markers, and any outstanding
    /// ping. Called by the supervisor on every loss, so nothing from a
    /// previous channel can ever be shown as live.
    pub(crate) fn reset(&mut self) {
        self.cache.invalidate_all();
        self.in_flight.clear();
        self.probe = LatencyProbe::new();
    }

    /// Install talk metadata: publish it and set the authoritative slide
    /// order. If a state notification already arrived, the position
    /// observer is re-derived against the fresh sequence.
    pub(crate) fn install_talk(&mut self, shared: &EngineShared, talk: TalkInfo) {
        self.cache.set_sequence(talk.slide_ids.clone());
        shared.talk.send_replace(Some(talk));

        let current = shared
            .presentation
            .borrow()
            .as_ref()
            .map(|state| state.current().clone());
        if let Some(current) = current {
            shared
                .position
                .send_replace(self.cache.display_index(&current));
        }
    }

    /// Decode and route one inbound frame.
    ///
    /// Returns the slide id to fetch when the new state references a
    /// slide missing from the cache. Malformed frames are logged and
    /// dropped; they never tear down the connection.
    pub(crate) fn handle_frame(
        &mut self,
        shared: &EngineShared,
        frame: &str,
    ) -> Option<SlideId> {
        let notification = match Notification::decode(frame) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, frame, "dropping malformed frame");
                return None;
            }
        };

        match notification {
            Notification::State(state) => self.apply_state(shared, state),
            Notification::Error(message) => {
                shared.report_error(message);
                None
            }
            Notification::Pong { timestamp } => {
                if let Some(sample) = self.probe.record_pong() {
                    debug!(round_trip = ?sample.round_trip, timestamp, "pong");
                    shared.latency.send_replace(Some(sample));
                } else {
                    debug!(timestamp, "pong with no ping outstanding, ignoring");
                }
                None
            }
        }
    }

    /// Replace the presentation state (the server is authoritative) and
    /// reconcile the slide observers against the cache.
    fn apply_state(
        &mut self,
        shared: &EngineShared,
        state: PresentationState,
    ) -> Option<SlideId> {
        let current = state.current().clone();
        shared.presentation.send_replace(Some(state));
        shared
            .position
            .send_replace(self.cache.display_index(&current));

        if let Some(slide) = self.cache.get(&current) {
            shared.current_slide.send_replace(Some(slide));
            return None;
        }

        // Cache miss: the previously displayed slide stays up until the
        // fetch lands. One fetch per id at a time.
        if self.in_flight.contains(&current) {
            return None;
        }
        self.in_flight.insert(current.clone());
        Some(current)
    }

    /// Apply a completed slide fetch.
    ///
    /// Successful results are always cached, but only shown when the
    /// slide is still the current one -- a result that resolved after a
    /// newer state took effect is explicitly discarded.
    pub(crate) fn apply_fetch(&mut self, shared: &EngineShared, outcome: FetchOutcome) {
        self.in_flight.remove(&outcome.id);

        match outcome.result {
            Ok(slide) => {
                let slide: Arc<Slide> = self.cache.insert(slide);
                let is_current = shared
                    .presentation
                    .borrow()
                    .as_ref()
                    .is_some_and(|state| state.current() == &outcome.id);

                if is_current {
                    shared.current_slide.send_replace(Some(slide));
                    shared
                        .position
                        .send_replace(self.cache.display_index(&outcome.id));
                } else {
                    debug!(slide = %outcome.id, "discarding stale slide fetch");
                }
            }
            Err(e) => {
                // Previous content stays on screen; the failure is only reported.
                shared.report_error(format!("failed to fetch slide {}: {e}", outcome.id));
            }
        }
    }

    /// Record an outgoing latency probe ping.
    pub(crate) fn mark_ping_sent(&mut self) {
        self.probe.mark_sent();
    }
}

// ── Tests ────────────────────────────────────────────────────────────
