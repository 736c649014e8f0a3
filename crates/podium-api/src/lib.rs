// podium-api: Wire-level I/O for the Podium presentation protocol

pub mod error;
pub mod session;
pub mod slides;
pub mod transport;

pub use error::Error;
pub use session::{Session, SessionEvent, SessionSink, SessionStream};
pub use slides::SlideClient;
