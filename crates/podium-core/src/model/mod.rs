// ── Domain model ──
//
// Protocol-facing types shared by the engine and its consumers.

mod slide;
mod state;

pub use slide::{Slide, SlideId, SlideKind, SlidePosition, TalkInfo};
pub use state::{LatencySample, PresentationState};

/// A client-to-server navigation/playback instruction.
///
/// Stateless: no payload beyond the tag. The wire layer adds its own
/// `Ping` variant for the latency probe; it is not part of the public
/// command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    First,
    Last,
    Play,
    Pause,
    Resume,
    Blink,
}
