// ── Engine facade ──
//
// The embedding front-end's handle on the synchronization machinery.
// `Engine` is cheaply cloneable; all clones share one supervisor task
// and one set of observable channels. Consumers read the channels,
// never the internals.

use std::sync::Arc;
use std::time::Duration;

use podium_api::SlideClient;
use podium_api::transport::TransportConfig;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{Command, LatencySample, PresentationState, Slide, SlidePosition, TalkInfo};
use crate::supervisor;

/// Where the engine stands with respect to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session and none wanted.
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Live channel established and registered.
    Connected,
    /// Channel lost; the supervisor is waiting out the backoff delay
    /// before attempt `attempt`.
    Reconnecting {
        attempt: u32,
        /// `None` means the supervisor retries forever.
        max_attempts: Option<u32>,
        delay: Duration,
    },
    /// The retry budget ran out. Terminal until the next `start`.
    Failed { message: String },
}

struct EngineTask {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

/// State shared between the facade and the supervisor task.
///
/// The `watch` senders are the single source of truth for everything an
/// observer can see; the supervisor's worker loop is their only writer
/// while a session is live.
pub(crate) struct EngineShared {
    pub(crate) config: ClientConfig,
    pub(crate) slides: SlideClient,

    pub(crate) connection_state: watch::Sender<ConnectionState>,
    pub(crate) presentation: watch::Sender<Option<PresentationState>>,
    pub(crate) current_slide: watch::Sender<Option<Arc<Slide>>>,
    pub(crate) position: watch::Sender<Option<SlidePosition>>,
    pub(crate) talk: watch::Sender<Option<TalkInfo>>,
    pub(crate) latency: watch::Sender<Option<LatencySample>>,
    pub(crate) last_error: watch::Sender<Option<String>>,

    command_tx: std::sync::Mutex<Option<mpsc::UnboundedSender<Command>>>,
    task: tokio::sync::Mutex<Option<EngineTask>>,
}

impl EngineShared {
    pub(crate) fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.http_timeout,
        };
        let slides = SlideClient::new(config.api_url.clone(), &transport)?;

        Ok(Self {
            config,
            slides,
            connection_state: watch::Sender::new(ConnectionState::Disconnected),
            presentation: watch::Sender::new(None),
            current_slide: watch::Sender::new(None),
            position: watch::Sender::new(None),
            talk: watch::Sender::new(None),
            latency: watch::Sender::new(None),
            last_error: watch::Sender::new(None),
            command_tx: std::sync::Mutex::new(None),
            task: tokio::sync::Mutex::new(None),
        })
    }

    pub(crate) fn set_connection_state(&self, state: ConnectionState) {
        debug!(?state, "connection state");
        self.connection_state.send_replace(state);
    }

    /// Surface an error to observers without changing any other state.
    pub(crate) fn report_error(&self, message: String) {
        self.last_error.send_replace(Some(message));
    }

    /// Reset everything tied to a live channel. Called whenever a
    /// session ends, so observers never see stale data presented as
    /// current. The last error survives the reset.
    pub(crate) fn clear_live_state(&self) {
        self.presentation.send_replace(None);
        self.current_slide.send_replace(None);
        self.position.send_replace(None);
        self.talk.send_replace(None);
        self.latency.send_replace(None);
    }

    fn command_sender(&self) -> Option<mpsc::UnboundedSender<Command>> {
        self.command_tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn set_command_sender(&self, tx: Option<mpsc::UnboundedSender<Command>>) {
        *self
            .command_tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = tx;
    }
}

/// The synchronization engine.
///
/// ```no_run
/// # async fn demo() -> Result<(), podium_core::CoreError> {
/// use podium_core::{ClientConfig, Command, Engine};
///
/// let config = ClientConfig::for_server(
///     "http://localhost:8080".parse().map_err(|e| {
///         podium_core::CoreError::Config { message: format!("{e}") }
///     })?,
///     "remote-1",
/// )?;
/// let engine = Engine::new(config)?;
/// engine.start().await?;
///
/// let mut states = engine.connection_state();
/// states.changed().await.ok();
///
/// engine.send_command(Command::Next)?;
/// engine.disconnect().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Engine {
    shared: Arc<EngineShared>,
}

impl Engine {
    /// Validate the configuration and build an engine. No I/O happens
    /// until [`start`](Self::start).
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(EngineShared::new(config)?),
        })
    }

    /// Spawn the supervisor and begin connecting.
    ///
    /// Idempotent while a supervisor is running. Calling `start` after a
    /// `Failed` or `Disconnected` outcome begins a fresh session with
    /// the attempt counter reset.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut task = self.shared.task.lock().await;
        if let Some(existing) = task.as_ref()
            && !existing.handle.is_finished()
        {
            debug!("engine already running");
            return Ok(());
        }

        info!(server = %self.shared.config.api_url, "starting engine");
        self.shared.last_error.send_replace(None);

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        self.shared.set_command_sender(Some(cmd_tx));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(supervisor::run(
            Arc::clone(&self.shared),
            cancel.clone(),
            cmd_rx,
        ));
        *task = Some(EngineTask { cancel, handle });
        Ok(())
    }

    /// Tear down the session and wait for the supervisor to finish.
    /// Idempotent; safe to call from any clone.
    pub async fn disconnect(&self) {
        let Some(task) = self.shared.task.lock().await.take() else {
            return;
        };

        info!("disconnecting");
        task.cancel.cancel();
        self.shared.set_command_sender(None);
        // The supervisor only ever exits voluntarily; a join error here
        // means it panicked, which there is nothing left to do about.
        let _ = task.handle.await;

        self.shared.clear_live_state();
        self.shared
            .set_connection_state(ConnectionState::Disconnected);
    }

    /// Queue a navigation or playback command for the live channel.
    ///
    /// Accepted only while `Connected`; the command is sent in queue
    /// order by the session worker. Fire-and-forget: any resulting state
    /// change arrives through the observers.
    pub fn send_command(&self, command: Command) -> Result<(), CoreError> {
        if *self.shared.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::NotConnected);
        }
        let tx = self.shared.command_sender().ok_or(CoreError::NotConnected)?;
        tx.send(command).map_err(|_| CoreError::NotConnected)
    }

    // ── Observers ────────────────────────────────────────────────────
    //
    // Each observer is a `watch` channel: a receiver always holds the
    // latest value and `changed()` wakes on every update.

    /// Connection lifecycle observer.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.connection_state.subscribe()
    }

    /// Presentation phase observer. `None` while no channel is live.
    pub fn presentation(&self) -> watch::Receiver<Option<PresentationState>> {
        self.shared.presentation.subscribe()
    }

    /// Content of the slide currently on stage, once fetched.
    pub fn current_slide(&self) -> watch::Receiver<Option<Arc<Slide>>> {
        self.shared.current_slide.subscribe()
    }

    /// Position of the current slide within the talk (`3/12`).
    pub fn position(&self) -> watch::Receiver<Option<SlidePosition>> {
        self.shared.position.subscribe()
    }

    /// Talk metadata observer.
    pub fn talk(&self) -> watch::Receiver<Option<TalkInfo>> {
        self.shared.talk.subscribe()
    }

    /// Most recent round-trip latency sample.
    pub fn latency(&self) -> watch::Receiver<Option<LatencySample>> {
        self.shared.latency.subscribe()
    }

    /// Most recent error surfaced by the server or the engine.
    pub fn last_error(&self) -> watch::Receiver<Option<String>> {
        self.shared.last_error.subscribe()
    }

    /// Connection lifecycle as a `Stream`, for `select!`-free consumers.
    pub fn connection_state_stream(&self) -> WatchStream<ConnectionState> {
        WatchStream::new(self.connection_state())
    }

    /// Presentation phase as a `Stream`.
    pub fn presentation_stream(&self) -> WatchStream<Option<PresentationState>> {
        WatchStream::new(self.presentation())
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn connection_state_snapshot(&self) -> ConnectionState {
        self.shared.connection_state.borrow().clone()
    }

    pub fn presentation_snapshot(&self) -> Option<PresentationState> {
        self.shared.presentation.borrow().clone()
    }

    pub fn current_slide_snapshot(&self) -> Option<Arc<Slide>> {
        self.shared.current_slide.borrow().clone()
    }

    pub fn position_snapshot(&self) -> Option<SlidePosition> {
        *self.shared.position.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let config = ClientConfig::for_server(
            "http://localhost:9".parse().expect("url"),
            "test-client",
        )
        .expect("config");
        Engine::new(config).expect("engine")
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = ClientConfig::for_server(
            "http://localhost:9".parse().expect("url"),
            "",
        )
        .expect("config");
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn send_command_requires_a_connection() {
        let engine = engine();
        assert!(matches!(
            engine.send_command(Command::Next),
            Err(CoreError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn disconnect_before_start_is_a_no_op() {
        let engine = engine();
        engine.disconnect().await;
        engine.disconnect().await;
        assert_eq!(
            engine.connection_state_snapshot(),
            ConnectionState::Disconnected
        );
    }

    #[test]
    fn observers_start_empty() {
        let engine = engine();
        assert_eq!(
            engine.connection_state_snapshot(),
            ConnectionState::Disconnected
        );
        assert!(engine.presentation_snapshot().is_none());
        assert!(engine.current_slide_snapshot().is_none());
        assert!(engine.position_snapshot().is_none());
        assert!(engine.latency().borrow().is_none());
        assert!(engine.last_error().borrow().is_none());
    }
}
