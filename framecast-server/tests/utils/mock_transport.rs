//! Scripted transport doubles for driving the session layer without WebRTC.

use async_trait::async_trait;
use framecast_core::{SessionDescription, VideoFrame};
use framecast_server::transport::{PeerTransport, TrackSource, TransportError, TransportFactory};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, Notify, mpsc};

/// Transport double that answers every offer with `answer-to:<sdp>` and
/// counts calls for verification.
pub struct MockTransport {
    offer_calls: AtomicUsize,
    close_calls: AtomicUsize,
    reject_offers: bool,
    gate: Option<Arc<Notify>>,
    track_tx: mpsc::Sender<Box<dyn TrackSource>>,
    track_rx: Mutex<mpsc::Receiver<Box<dyn TrackSource>>>,
}

impl MockTransport {
    fn with(reject_offers: bool, gate: Option<Arc<Notify>>) -> Arc<Self> {
        let (track_tx, track_rx) = mpsc::channel(8);
        Arc::new(Self {
            offer_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            reject_offers,
            gate,
            track_tx,
            track_rx: Mutex::new(track_rx),
        })
    }

    /// Simulates the transport accepting an inbound track.
    pub async fn push_track(&self, track: ScriptedTrack) {
        self.track_tx
            .send(Box::new(track))
            .await
            .expect("track channel open");
    }

    pub fn offers(&self) -> usize {
        self.offer_calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn apply_offer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, TransportError> {
        self.offer_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.reject_offers {
            return Err(TransportError::OfferRejected("scripted rejection".into()));
        }
        Ok(SessionDescription {
            sdp: format!("answer-to:{}", offer.sdp),
            kind: "answer".into(),
        })
    }

    async fn accept_track(&self) -> Option<Box<dyn TrackSource>> {
        self.track_rx.lock().await.recv().await
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory double that remembers every transport it created.
pub struct MockTransportFactory {
    reject_offers: bool,
    gate: Option<Arc<Notify>>,
    transports: StdMutex<Vec<Arc<MockTransport>>>,
}

impl MockTransportFactory {
    pub fn new() -> Arc<Self> {
        Self::with(false, None)
    }

    /// Every transport rejects every offer.
    pub fn rejecting() -> Arc<Self> {
        Self::with(true, None)
    }

    /// Every `apply_offer` waits for one `gate.notify_one()` before
    /// completing, keeping negotiations in flight under test control.
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Self::with(false, Some(gate))
    }

    fn with(reject_offers: bool, gate: Option<Arc<Notify>>) -> Arc<Self> {
        Arc::new(Self {
            reject_offers,
            gate,
            transports: StdMutex::new(Vec::new()),
        })
    }

    pub fn created(&self) -> usize {
        self.transports.lock().unwrap().len()
    }

    /// The `index`-th transport handed out, in creation order.
    pub fn transport(&self, index: usize) -> Arc<MockTransport> {
        self.transports.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(&self) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let transport = MockTransport::with(self.reject_offers, self.gate.clone());
        self.transports.lock().unwrap().push(transport.clone());
        Ok(transport)
    }
}

enum TrackStep {
    Frame(VideoFrame),
    Fault(String),
    WaitFor(Arc<Notify>),
}

/// Track double replaying a fixed sequence of steps.
pub struct ScriptedTrack {
    id: String,
    steps: VecDeque<TrackStep>,
    pending_when_empty: bool,
    drop_flag: Option<Arc<AtomicBool>>,
}

impl ScriptedTrack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: VecDeque::new(),
            pending_when_empty: false,
            drop_flag: None,
        }
    }

    pub fn with_frame(mut self, frame: VideoFrame) -> Self {
        self.steps.push_back(TrackStep::Frame(frame));
        self
    }

    pub fn with_fault(mut self, message: impl Into<String>) -> Self {
        self.steps.push_back(TrackStep::Fault(message.into()));
        self
    }

    pub fn with_wait(mut self, gate: Arc<Notify>) -> Self {
        self.steps.push_back(TrackStep::WaitFor(gate));
        self
    }

    /// After the scripted steps, block forever instead of signaling
    /// end-of-stream; exercises cooperative cancellation.
    pub fn pending_when_empty(mut self) -> Self {
        self.pending_when_empty = true;
        self
    }

    /// Sets `flag` when the track is dropped, observing task cancellation.
    pub fn on_drop(mut self, flag: Arc<AtomicBool>) -> Self {
        self.drop_flag = Some(flag);
        self
    }
}

impl Drop for ScriptedTrack {
    fn drop(&mut self) {
        if let Some(flag) = &self.drop_flag {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl TrackSource for ScriptedTrack {
    fn id(&self) -> &str {
        &self.id
    }

    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, TransportError> {
        loop {
            match self.steps.pop_front() {
                Some(TrackStep::Frame(frame)) => return Ok(Some(frame)),
                Some(TrackStep::Fault(message)) => return Err(TransportError::Track(message)),
                Some(TrackStep::WaitFor(gate)) => gate.notified().await,
                None if self.pending_when_empty => std::future::pending::<()>().await,
                None => return Ok(None),
            }
        }
    }
}
