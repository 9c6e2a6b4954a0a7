//! Bounded frame delivery queue between track ingest and the display stage.
//!
//! Multi-producer, single-consumer. Backpressure is producer throttling: a
//! producer at capacity waits for a slot instead of growing the buffer or
//! dropping frames.

use framecast_core::VideoFrame;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// The consumer side of the queue is gone; ingest should stop.
#[derive(Debug, Error)]
#[error("frame queue closed")]
pub struct QueueClosed;

/// Creates a queue holding at most `capacity` frames.
pub fn bounded(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (FrameSender { tx }, FrameReceiver { rx })
}

/// Producer handle, cloned into every ingest task. Frames from superseded
/// sessions may still arrive through older clones; that is tolerated.
#[derive(Clone)]
pub struct FrameSender {
    tx: mpsc::Sender<VideoFrame>,
}

impl FrameSender {
    /// Enqueues one frame, waiting while the queue is at capacity.
    pub async fn produce(&self, frame: VideoFrame) -> Result<(), QueueClosed> {
        self.tx.send(frame).await.map_err(|_| QueueClosed)
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// The single consumer handle, owned by the display stage.
pub struct FrameReceiver {
    rx: mpsc::Receiver<VideoFrame>,
}

impl FrameReceiver {
    /// Waits up to `wait` for the next frame. `None` is the timeout signal
    /// (or every producer is gone), letting the caller re-check its stop
    /// condition; it is not an error.
    pub async fn consume(&mut self, wait: Duration) -> Option<VideoFrame> {
        match tokio::time::timeout(wait, self.rx.recv()).await {
            Ok(frame) => frame,
            Err(_) => None,
        }
    }
}
