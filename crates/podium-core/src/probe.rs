// ── Latency probe ──
//
// Round-trip measurement over the live channel. The dispatch worker
// drives the timer; this type only tracks the in-flight ping and turns
// a matching pong into a sample. A pong with no ping outstanding is
// ignored (it belongs to a previous channel).

use std::time::Instant;

use chrono::Utc;

use crate::model::LatencySample;

#[derive(Debug, Default)]
pub(crate) struct LatencyProbe {
    in_flight: Option<Instant>,
}

impl LatencyProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record that a ping frame is about to be sent. A new ping
    /// supersedes any unanswered one.
    pub(crate) fn mark_sent(&mut self) {
        self.in_flight = Some(Instant::now());
    }

    /// Match an inbound pong against the outstanding ping.
    pub(crate) fn record_pong(&mut self) -> Option<LatencySample> {
        let sent = self.in_flight.take()?;
        Some(LatencySample {
            round_trip: sent.elapsed(),
            taken_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pong_without_ping_is_ignored() {
        let mut probe = LatencyProbe::new();
        assert!(probe.record_pong().is_none());
    }

    #[test]
    fn pong_after_ping_yields_one_sample() {
        let mut probe = LatencyProbe::new();
        probe.mark_sent();

        let sample = probe.record_pong().expect("sample");
        assert!(sample.round_trip < std::time::Duration::from_secs(1));

        // The in-flight marker is consumed: a second pong is stale.
        assert!(probe.record_pong().is_none());
    }

    #[test]
    fn new_ping_supersedes_unanswered_one() {
        let mut probe = LatencyProbe::new();
        probe.mark_sent();
        probe.mark_sent();

        assert!(probe.record_pong().is_some());
        assert!(probe.record_pong().is_none());
    }
}
