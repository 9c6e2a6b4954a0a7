//! Decoder seam between the transport and the ingest pipeline.
//!
//! Codec decode is owned by an external collaborator: the server only defines
//! the boundary and routes depacketized samples through whatever decoder the
//! embedding application registered for the track's MIME type. Tracks with no
//! registered decoder are ignored with a warning.

use crate::transport::TransportError;
use framecast_core::VideoFrame;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns depacketized codec samples into raw frames. A decoder may buffer
/// internally and produce `None` until it has a full picture.
pub trait FrameDecoder: Send {
    fn decode(&mut self, sample: &[u8]) -> Result<Option<VideoFrame>, TransportError>;
}

type DecoderFactory = dyn Fn() -> Box<dyn FrameDecoder> + Send + Sync;

/// Per-MIME-type decoder factories, one decoder instance per accepted track.
#[derive(Default, Clone)]
pub struct DecoderRegistry {
    factories: HashMap<String, Arc<DecoderFactory>>,
}

impl DecoderRegistry {
    pub fn register<F>(&mut self, mime_type: &str, factory: F)
    where
        F: Fn() -> Box<dyn FrameDecoder> + Send + Sync + 'static,
    {
        self.factories
            .insert(mime_type.to_ascii_lowercase(), Arc::new(factory));
    }

    /// Builds a fresh decoder for the given MIME type, if one is registered.
    pub fn make(&self, mime_type: &str) -> Option<Box<dyn FrameDecoder>> {
        self.factories
            .get(&mime_type.to_ascii_lowercase())
            .map(|factory| factory())
    }
}
