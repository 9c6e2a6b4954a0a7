use crate::session::PeerRegistry;
use crate::transport::{PeerTransport, TransportError};
use framecast_core::{SessionDescription, SessionId};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use thiserror::Error;
use tokio::task::AbortHandle;
use tracing::debug;

/// Offer/answer negotiation state of a peer session.
///
/// The state leaves `Stable` only while an exchange is outstanding. `Closed`
/// is terminal: every transition out of it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    Closed,
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalingState::Stable => "stable",
            SignalingState::HaveLocalOffer => "have-local-offer",
            SignalingState::HaveRemoteOffer => "have-remote-offer",
            SignalingState::Closed => "closed",
        })
    }
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("signaling state is {0}, not stable")]
    NotStable(SignalingState),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// One peer: an exclusively-owned transport handle, its negotiation state,
/// and the ingest tasks spawned for its accepted tracks.
pub struct PeerSession {
    id: SessionId,
    transport: Arc<dyn PeerTransport>,
    state: Mutex<SignalingState>,
    ingest_tasks: Mutex<Vec<AbortHandle>>,
    registry: Weak<PeerRegistry>,
}

impl PeerSession {
    pub(crate) fn new(transport: Arc<dyn PeerTransport>, registry: Weak<PeerRegistry>) -> Self {
        Self {
            id: SessionId::new(),
            transport,
            state: Mutex::new(SignalingState::Stable),
            ingest_tasks: Mutex::new(Vec::new()),
            registry,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn signaling_state(&self) -> SignalingState {
        *self.lock_state()
    }

    pub(crate) fn transport(&self) -> &Arc<dyn PeerTransport> {
        &self.transport
    }

    /// Applies a remote offer and returns the local answer.
    ///
    /// Fails without side effects when the state is not `Stable`. A transport
    /// rejection closes the session as part of failure handling; a close that
    /// lands mid-negotiation aborts the exchange the same way.
    pub async fn negotiate(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        {
            let mut state = self.lock_state();
            match *state {
                SignalingState::Stable => *state = SignalingState::HaveRemoteOffer,
                other => return Err(NegotiationError::NotStable(other)),
            }
        }

        match self.transport.apply_offer(offer).await {
            Ok(answer) => {
                let mut state = self.lock_state();
                match *state {
                    SignalingState::HaveRemoteOffer => {
                        *state = SignalingState::Stable;
                        Ok(answer)
                    }
                    // Closed while the exchange was in flight.
                    _ => Err(NegotiationError::Transport(TransportError::Closed)),
                }
            }
            Err(e) => {
                self.close().await;
                Err(NegotiationError::Transport(e))
            }
        }
    }

    /// Tears the session down: deregisters it, cancels its ingest tasks, and
    /// closes the transport. Idempotent — the first caller performs every
    /// side effect exactly once, later callers return immediately.
    pub async fn close(&self) {
        {
            let mut state = self.lock_state();
            if *state == SignalingState::Closed {
                return;
            }
            *state = SignalingState::Closed;
        }

        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
        }

        let tasks = std::mem::take(&mut *self.lock_tasks());
        debug!(session = %self.id, tasks = tasks.len(), "cancelling ingest tasks");
        for task in tasks {
            task.abort();
        }

        self.transport.close().await;
    }

    /// Tracks an ingest task so `close` can cancel it. A task registered
    /// after close is cancelled on the spot. The task list lock is held
    /// across the state check so a concurrent close cannot miss the task.
    pub(crate) fn register_task(&self, task: AbortHandle) {
        let mut tasks = self.lock_tasks();
        if *self.lock_state() == SignalingState::Closed {
            drop(tasks);
            task.abort();
            return;
        }
        tasks.push(task);
    }

    fn lock_state(&self) -> MutexGuard<'_, SignalingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<AbortHandle>> {
        self.ingest_tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}
