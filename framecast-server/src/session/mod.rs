mod ingest;
mod manager;
mod peer_session;
mod registry;

pub use manager::SessionManager;
pub use peer_session::{NegotiationError, PeerSession, SignalingState};
pub use registry::PeerRegistry;
