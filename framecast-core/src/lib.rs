pub mod model;

pub use model::{EventPayload, SessionDescription, SessionId, SignalMessage, VideoFormat, VideoFrame};
