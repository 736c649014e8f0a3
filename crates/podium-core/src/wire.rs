// ── Wire codec ──
//
// JSON frame shapes exchanged over the WebSocket channel. Inbound frames
// decode to exactly one `Notification`; outbound frames are built from
// the public `Command` set plus the engine-internal `Register` and `Ping`
// frames. Decode failures are reported to the caller, never panicked on.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Command, PresentationState, SlideId};

// ── Inbound notifications ────────────────────────────────────────────

/// A server-originated push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    State(PresentationState),
    Error(String),
    Pong { timestamp: u64 },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum InboundFrame {
    State { state: WireState },
    Error { message: String },
    Pong { timestamp: u64 },
}

#[derive(Debug, Deserialize)]
struct WireState {
    state: WirePhase,
    current: String,
    #[serde(rename = "totalDurationMs")]
    total_duration_ms: u64,
}

#[derive(Debug, Deserialize)]
enum WirePhase {
    Running,
    Paused,
    Done,
}

impl Notification {
    /// Decode one inbound text frame.
    pub fn decode(frame: &str) -> Result<Self, CoreError> {
        let inbound: InboundFrame =
            serde_json::from_str(frame).map_err(|e| CoreError::Decode {
                message: e.to_string(),
            })?;

        Ok(match inbound {
            InboundFrame::State { state } => {
                let current = SlideId::new(state.current);
                let total_duration = std::time::Duration::from_millis(state.total_duration_ms);
                Notification::State(match state.state {
                    WirePhase::Running => PresentationState::Running {
                        current,
                        total_duration,
                    },
                    WirePhase::Paused => PresentationState::Paused {
                        current,
                        total_duration,
                    },
                    WirePhase::Done => PresentationState::Done {
                        current,
                        total_duration,
                    },
                })
            }
            InboundFrame::Error { message } => Notification::Error(message),
            InboundFrame::Pong { timestamp } => Notification::Pong { timestamp },
        })
    }
}

// ── Outbound frames ──────────────────────────────────────────────────

/// Wire-level command tags. A superset of the public [`Command`] set:
/// `Ping` exists only for the latency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum CommandTag {
    Next,
    Previous,
    First,
    Last,
    Play,
    Pause,
    Resume,
    Blink,
    Ping,
}

impl From<Command> for CommandTag {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Next => Self::Next,
            Command::Previous => Self::Previous,
            Command::First => Self::First,
            Command::Last => Self::Last,
            Command::Play => Self::Play,
            Command::Pause => Self::Pause,
            Command::Resume => Self::Resume,
            Command::Blink => Self::Blink,
        }
    }
}

/// A client-originated frame.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub(crate) enum OutboundFrame {
    /// Sent once, immediately after channel open, before any command.
    Register {
        #[serde(rename = "clientId")]
        client_id: String,
    },
    Command {
        command: CommandTag,
    },
}

impl OutboundFrame {
    pub(crate) fn register(client_id: &str) -> Self {
        Self::Register {
            client_id: client_id.to_owned(),
        }
    }

    pub(crate) fn command(cmd: Command) -> Self {
        Self::Command {
            command: cmd.into(),
        }
    }

    pub(crate) fn ping() -> Self {
        Self::Command {
            command: CommandTag::Ping,
        }
    }

    pub(crate) fn encode(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::Internal(e.to_string()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn decode_state_running() {
        let frame = r#"{"type":"State","state":{"state":"Running","current":"3","totalDurationMs":9500}}"#;

        let n = Notification::decode(frame).unwrap();
        assert_eq!(
            n,
            Notification::State(PresentationState::Running {
                current: SlideId::new("3"),
                total_duration: Duration::from_millis(9500),
            })
        );
    }

    #[test]
    fn decode_state_paused_and_done() {
        for (phase, expect_running) in [("Paused", false), ("Done", false)] {
            let frame = json!({
                "type": "State",
                "state": { "state": phase, "current": "cover", "totalDurationMs": 0 }
            });
            let n = Notification::decode(&frame.to_string()).unwrap();
            let Notification::State(state) = n else {
                panic!("expected State");
            };
            assert_eq!(state.current().as_str(), "cover");
            assert_eq!(state.is_running(), expect_running);
        }
    }

    #[test]
    fn decode_error_and_pong() {
        let n = Notification::decode(r#"{"type":"Error","message":"no such slide"}"#).unwrap();
        assert_eq!(n, Notification::Error("no such slide".into()));

        let n = Notification::decode(r#"{"type":"Pong","timestamp":1755900000000}"#).unwrap();
        assert_eq!(
            n,
            Notification::Pong {
                timestamp: 1_755_900_000_000
            }
        );
    }

    #[test]
    fn decode_rejects_malformed_frames() {
        assert!(Notification::decode("not json").is_err());
        assert!(Notification::decode(r#"{"type":"Warp"}"#).is_err());
        assert!(Notification::decode(r#"{"type":"State","state":{}}"#).is_err());
    }

    #[test]
    fn encode_register() {
        let frame = OutboundFrame::register("mobile-7").encode().unwrap();
        assert_eq!(frame, r#"{"type":"Register","clientId":"mobile-7"}"#);
    }

    #[test]
    fn encode_every_command_tag() {
        let cases = [
            (Command::Next, "Next"),
            (Command::Previous, "Previous"),
            (Command::First, "First"),
            (Command::Last, "Last"),
            (Command::Play, "Play"),
            (Command::Pause, "Pause"),
            (Command::Resume, "Resume"),
            (Command::Blink, "Blink"),
        ];

        for (cmd, tag) in cases {
            let frame = OutboundFrame::command(cmd).encode().unwrap();
            assert_eq!(frame, format!(r#"{{"type":"Command","command":"{tag}"}}"#));
        }
    }

    #[test]
    fn encode_ping() {
        let frame = OutboundFrame::ping().encode().unwrap();
        assert_eq!(frame, r#"{"type":"Command","command":"Ping"}"#);
    }
}
