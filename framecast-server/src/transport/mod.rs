//! Transport collaborator seam.
//!
//! The peer session only sees these traits; the WebRTC-backed implementation
//! lives in [`rtc`]. Tests drive the session layer with scripted transports.

mod rtc;

pub use rtc::{RtcConfig, RtcTransport, RtcTransportFactory};

use async_trait::async_trait;
use framecast_core::{SessionDescription, VideoFrame};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport setup failed: {0}")]
    Setup(String),
    #[error("offer rejected: {0}")]
    OfferRejected(String),
    #[error("transport closed")]
    Closed,
    #[error("track failed: {0}")]
    Track(String),
}

/// One negotiated media transport, exclusively owned by a peer session.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Applies a remote offer and returns the local answer. Fails unless the
    /// transport is ready to negotiate.
    async fn apply_offer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, TransportError>;

    /// Next accepted inbound track, in arrival order. Returns `None` once the
    /// transport is closed and no further track can arrive.
    async fn accept_track(&self) -> Option<Box<dyn TrackSource>>;

    /// Tears the transport down. Idempotent.
    async fn close(&self);
}

/// Lazy, per-track sequence of raw frames.
#[async_trait]
pub trait TrackSource: Send {
    fn id(&self) -> &str;

    /// Next frame from the track. `Ok(None)` is the end-of-stream signal;
    /// an error is an unexpected transport fault terminal for this track.
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, TransportError>;
}

/// Builds one transport per peer session.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
