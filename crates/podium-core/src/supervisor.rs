// ── Connection supervisor ──
//
// Owns the channel lifecycle: open, register, run the connected loop,
// and on loss retry with bounded exponential backoff. The connected
// loop is the engine's single logical worker -- frames, fetch results,
// queued commands and probe ticks all funnel through one `select!`, so
// every observer update happens in a well-defined order.

use std::sync::Arc;
use std::time::Duration;

use podium_api::{Session, SessionEvent, SessionSink, SessionStream};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ReconnectPolicy;
use crate::dispatch::{FetchOutcome, SessionContext};
use crate::engine::{ConnectionState, EngineShared};
use crate::error::CoreError;
use crate::model::{Command, SlideId, TalkInfo};
use crate::wire::OutboundFrame;

/// Why the connected loop ended.
enum CloseCause {
    /// Shutdown was requested; the supervisor must not reconnect.
    Cancelled,
    /// The channel is gone; the supervisor decides whether to retry.
    Lost(String),
}

/// Supervisor entry point, spawned once per `Engine::start`.
///
/// Runs until cancelled or until the retry budget is exhausted.
pub(crate) async fn run(
    shared: Arc<EngineShared>,
    cancel: CancellationToken,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) {
    let policy = shared.config.reconnect.clone();
    let mut attempt: u32 = 0;
    let mut ctx = SessionContext::new();

    loop {
        shared.set_connection_state(ConnectionState::Connecting);

        let session = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = Session::open(&shared.config.ws_url) => result,
        };

        match session {
            Ok(session) => {
                match run_session(&shared, &cancel, &mut cmd_rx, &mut ctx, &mut attempt, session)
                    .await
                {
                    CloseCause::Cancelled => return,
                    CloseCause::Lost(reason) => {
                        warn!(%reason, "channel lost");
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, "connection attempt failed");
            }
        }

        // Whatever was live belongs to the dead channel now.
        ctx.reset();
        shared.clear_live_state();

        attempt += 1;
        if let Some(max) = policy.max_attempts
            && attempt > max
        {
            warn!(attempts = max, "retry budget exhausted, giving up");
            let e = CoreError::MaxRetriesReached { attempts: max };
            shared.report_error(e.to_string());
            shared.set_connection_state(ConnectionState::Failed {
                message: e.to_string(),
            });
            return;
        }

        let delay = backoff_delay(attempt, &policy);
        info!(attempt, ?delay, "reconnecting");
        shared.set_connection_state(ConnectionState::Reconnecting {
            attempt,
            max_attempts: policy.max_attempts,
            delay,
        });

        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(delay) => {}
        }
    }
}

/// Drive one open session from registration to loss.
async fn run_session(
    shared: &Arc<EngineShared>,
    cancel: &CancellationToken,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    ctx: &mut SessionContext,
    attempt: &mut u32,
    session: Session,
) -> CloseCause {
    let (mut sink, stream) = session.split();

    let register = match OutboundFrame::register(&shared.config.client_id).encode() {
        Ok(frame) => frame,
        Err(e) => return CloseCause::Lost(format!("cannot encode register frame: {e}")),
    };
    if let Err(e) = sink.send_text(register).await {
        return CloseCause::Lost(format!("register failed: {e}"));
    }

    // Commands queued against a previous channel are stale: the server
    // state they targeted is unknown now. Drop them before anyone can
    // queue against the new channel.
    while cmd_rx.try_recv().is_ok() {}

    info!(client_id = %shared.config.client_id, "connected and registered");
    shared.set_connection_state(ConnectionState::Connected);

    // A successful registration restores the full retry budget: the
    // counter measures consecutive failures, not lifetime drops.
    *attempt = 0;

    load_talk(shared, ctx).await;

    connected_loop(shared, cancel, cmd_rx, ctx, sink, stream).await
}

/// Fetch talk metadata for the fresh channel. A failure is reported but
/// does not tear the channel down: slides still resolve individually,
/// only the position display stays empty.
async fn load_talk(shared: &Arc<EngineShared>, ctx: &mut SessionContext) {
    match shared.slides.talk_info().await {
        Ok(response) => {
            let talk = TalkInfo::from(response);
            debug!(title = %talk.title, slides = talk.slide_ids.len(), "talk loaded");
            ctx.install_talk(shared, talk);
        }
        Err(e) => {
            warn!(error = %e, "failed to load talk metadata");
            shared.report_error(format!("failed to load talk metadata: {e}"));
        }
    }
}

async fn connected_loop(
    shared: &Arc<EngineShared>,
    cancel: &CancellationToken,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    ctx: &mut SessionContext,
    mut sink: SessionSink,
    mut stream: SessionStream,
) -> CloseCause {
    // Fetch results re-enter the loop through this per-channel queue, so
    // a completion from a dead channel can never reach a live context.
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchOutcome>();

    let period = shared.config.ping_interval;
    let mut ping = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                return CloseCause::Cancelled;
            }

            event = stream.next_event() => match event {
                SessionEvent::Frame(frame) => {
                    if let Some(id) = ctx.handle_frame(shared, &frame) {
                        spawn_fetch(shared, &fetch_tx, id);
                    }
                }
                SessionEvent::Closed(reason) => {
                    return CloseCause::Lost(reason);
                }
            },

            Some(outcome) = fetch_rx.recv() => {
                ctx.apply_fetch(shared, outcome);
            }

            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => {
                    debug!(?cmd, "sending command");
                    let frame = match OutboundFrame::command(cmd).encode() {
                        Ok(frame) => frame,
                        Err(e) => {
                            shared.report_error(e.to_string());
                            continue;
                        }
                    };
                    if let Err(e) = sink.send_text(frame).await {
                        return CloseCause::Lost(format!("send failed: {e}"));
                    }
                }
                // Sender gone means the engine is shutting down.
                None => return CloseCause::Cancelled,
            },

            _ = ping.tick() => {
                let frame = match OutboundFrame::ping().encode() {
                    Ok(frame) => frame,
                    Err(e) => {
                        shared.report_error(e.to_string());
                        continue;
                    }
                };
                ctx.mark_ping_sent();
                if let Err(e) = sink.send_text(frame).await {
                    return CloseCause::Lost(format!("ping failed: {e}"));
                }
            }
        }
    }
}

/// Resolve one slide off the worker. The result is re-queued rather than
/// applied here, so the worker stays the only writer of observer state.
fn spawn_fetch(
    shared: &Arc<EngineShared>,
    fetch_tx: &mpsc::UnboundedSender<FetchOutcome>,
    id: SlideId,
) {
    let slides = shared.slides.clone();
    let fetch_tx = fetch_tx.clone();
    tokio::spawn(async move {
        let result = slides
            .slide(id.as_str())
            .await
            .map(crate::model::Slide::from)
            .map_err(|e| CoreError::Fetch {
                message: e.to_string(),
            });
        // The channel may already be gone; nothing left to tell.
        let _ = fetch_tx.send(FetchOutcome { id, result });
    });
}

/// Bounded exponential backoff: `initial * 2^(attempt-1)`, capped at
/// `max_delay`. Deterministic -- the delay for attempt N never shrinks.
pub(crate) fn backoff_delay(attempt: u32, policy: &ReconnectPolicy) -> Duration {
    let exp = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let delay = policy.initial_delay.as_secs_f64() * 2f64.powi(exp);
    Duration::from_secs_f64(delay.min(policy.max_delay.as_secs_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: Some(10),
        }
    }

    #[test]
    fn backoff_doubles_from_the_initial_delay() {
        let policy = policy();
        assert_eq!(backoff_delay(1, &policy), Duration::from_secs(1));
        assert_eq!(backoff_delay(2, &policy), Duration::from_secs(2));
        assert_eq!(backoff_delay(3, &policy), Duration::from_secs(4));
        assert_eq!(backoff_delay(4, &policy), Duration::from_secs(8));
    }

    #[test]
    fn backoff_is_capped_at_the_maximum() {
        let policy = policy();
        assert_eq!(backoff_delay(6, &policy), Duration::from_secs(30));
        assert_eq!(backoff_delay(7, &policy), Duration::from_secs(30));
        // Far past the cap the arithmetic overflows into infinity; the
        // cap still holds.
        assert_eq!(backoff_delay(10_000, &policy), Duration::from_secs(30));
    }

    #[test]
    fn backoff_never_decreases() {
        let policy = policy();
        let mut previous = Duration::ZERO;
        for attempt in 1..=64 {
            let delay = backoff_delay(attempt, &policy);
            assert!(delay >= previous, "delay shrank at attempt {attempt}");
            previous = delay;
        }
    }
}
