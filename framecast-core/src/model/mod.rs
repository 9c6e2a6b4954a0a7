mod frame;
mod session;
mod signaling;

pub use frame::{VideoFormat, VideoFrame};
pub use session::SessionId;
pub use signaling::{EventPayload, SessionDescription, SignalMessage};
