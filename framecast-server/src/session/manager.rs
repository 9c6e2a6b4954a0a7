use crate::queue::FrameSender;
use crate::session::{PeerRegistry, PeerSession, ingest};
use crate::transport::{TransportError, TransportFactory};
use std::sync::Arc;
use tracing::info;

/// Creates, replaces, and destroys peer sessions. Cheap to clone; all clones
/// share one registry.
#[derive(Clone)]
pub struct SessionManager {
    registry: Arc<PeerRegistry>,
    factory: Arc<dyn TransportFactory>,
    frames: FrameSender,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn TransportFactory>, frames: FrameSender) -> Self {
        Self {
            registry: Arc::new(PeerRegistry::default()),
            factory,
            frames,
        }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    /// Builds a transport, registers a fresh session around it, and starts
    /// its track dispatcher.
    pub async fn create(&self) -> Result<Arc<PeerSession>, TransportError> {
        let transport = self.factory.create().await?;
        let session = Arc::new(PeerSession::new(transport, Arc::downgrade(&self.registry)));
        self.registry.insert(session.clone());
        ingest::spawn_track_dispatch(&session, self.frames.clone());
        info!(session = %session.id(), "peer session created");
        Ok(session)
    }

    /// Idempotent teardown; see [`PeerSession::close`].
    pub async fn close(&self, session: &Arc<PeerSession>) {
        let was_live = self.registry.contains(&session.id());
        session.close().await;
        if was_live {
            info!(session = %session.id(), "peer session closed");
        }
    }

    /// Replaces `old` with a fresh session so the next offer starts a clean
    /// negotiation. When transport creation fails, `old` is left untouched.
    pub async fn replace(
        &self,
        old: &Arc<PeerSession>,
    ) -> Result<Arc<PeerSession>, TransportError> {
        let fresh = self.create().await?;
        self.close(old).await;
        Ok(fresh)
    }
}
