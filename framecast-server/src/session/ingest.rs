//! Track ingest: one task per accepted track, pulling frames from the
//! transport into the frame queue.

use crate::media;
use crate::queue::FrameSender;
use crate::session::PeerSession;
use crate::transport::TrackSource;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Spawns the per-session dispatcher that consumes the transport's sequence
/// of accepted tracks and starts one ingest task for each.
pub(crate) fn spawn_track_dispatch(session: &Arc<PeerSession>, frames: FrameSender) {
    let dispatch_session = session.clone();
    let handle = tokio::spawn(async move {
        while let Some(track) = dispatch_session.transport().accept_track().await {
            info!(session = %dispatch_session.id(), track = track.id(), "track accepted");
            let ingest = tokio::spawn(ingest_track(track, frames.clone()));
            dispatch_session.register_task(ingest.abort_handle());
        }
        debug!(session = %dispatch_session.id(), "track dispatch finished");
    });
    session.register_task(handle.abort_handle());
}

/// Runs until the track ends, the task is cancelled, or the transport
/// faults. A terminated ingest task is discarded, never restarted.
async fn ingest_track(mut track: Box<dyn TrackSource>, frames: FrameSender) {
    loop {
        match track.next_frame().await {
            Ok(Some(frame)) => {
                let frame = match media::to_bgr24(frame) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(track = track.id(), error = %e, "dropping malformed frame");
                        continue;
                    }
                };
                if frames.produce(frame).await.is_err() {
                    debug!(track = track.id(), "frame queue closed, stopping ingest");
                    break;
                }
            }
            Ok(None) => {
                info!(track = track.id(), "track ended");
                break;
            }
            Err(e) => {
                error!(track = track.id(), error = %e, "track ingest failed");
                break;
            }
        }
    }
}
