use crate::session::PeerSession;
use dashmap::DashMap;
use framecast_core::SessionId;
use std::sync::Arc;

/// Live-session registry owned by the [`SessionManager`] and injected where
/// needed — never a process-wide singleton.
///
/// Membership invariant: a session is present exactly while it is not yet
/// closed; [`PeerSession::close`] deregisters itself.
///
/// [`SessionManager`]: crate::session::SessionManager
#[derive(Default)]
pub struct PeerRegistry {
    sessions: DashMap<SessionId, Arc<PeerSession>>,
}

impl PeerRegistry {
    pub(crate) fn insert(&self, session: Arc<PeerSession>) {
        self.sessions.insert(session.id(), session);
    }

    pub(crate) fn remove(&self, id: &SessionId) -> Option<Arc<PeerSession>> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
