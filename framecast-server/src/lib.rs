pub mod config;
pub mod media;
pub mod net;
pub mod queue;
pub mod server;
pub mod session;
pub mod signaling;
pub mod transport;

pub use config::ServerConfig;
pub use queue::{FrameReceiver, FrameSender};
pub use session::{PeerRegistry, PeerSession, SessionManager, SignalingState};
pub use signaling::ConnectionHandler;
pub use transport::{PeerTransport, TrackSource, TransportError, TransportFactory};
