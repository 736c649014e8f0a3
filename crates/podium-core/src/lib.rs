//! # podium-core
//!
//! Synchronization engine for driving a live presentation remotely.
//!
//! The engine keeps a WebSocket channel to the presentation server,
//! mirrors the server's authoritative state into observable channels,
//! fetches and caches slide content on demand, and reconnects with
//! bounded backoff when the channel drops. Front-ends construct an
//! [`Engine`], subscribe to its observers, and queue [`Command`]s.
//!
//! Wire-level I/O lives in `podium-api`; this crate owns the domain
//! model and all lifecycle decisions.

mod cache;
pub mod config;
mod convert;
mod dispatch;
pub mod engine;
pub mod error;
pub mod model;
mod probe;
mod supervisor;
pub mod wire;

pub use config::{ClientConfig, ReconnectPolicy};
pub use engine::{ConnectionState, Engine};
pub use error::CoreError;
pub use model::{
    Command, LatencySample, PresentationState, Slide, SlideId, SlideKind, SlidePosition, TalkInfo,
};
pub use wire::Notification;
