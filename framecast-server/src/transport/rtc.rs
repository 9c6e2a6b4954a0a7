//! WebRTC-backed transport.

use crate::media::{DecoderRegistry, FrameDecoder};
use crate::transport::{PeerTransport, TrackSource, TransportError, TransportFactory};
use async_trait::async_trait;
use bytes::Bytes;
use framecast_core::{SessionDescription, VideoFrame};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_H264, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::media::io::sample_builder::SampleBuilder;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp::codecs::h264::H264Packet;
use webrtc::rtp::codecs::vp8::Vp8Packet;
use webrtc::rtp::packetizer::Depacketizer;
use webrtc::track::track_remote::TrackRemote;

/// Static WebRTC configuration.
#[derive(Clone)]
pub struct RtcConfig {
    pub ice_servers: Vec<String>,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
        }
    }
}

pub struct RtcTransportFactory {
    config: RtcConfig,
    decoders: DecoderRegistry,
}

impl RtcTransportFactory {
    pub fn new(config: RtcConfig, decoders: DecoderRegistry) -> Self {
        Self { config, decoders }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(&self) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let transport = RtcTransport::connect(&self.config, self.decoders.clone()).await?;
        Ok(Arc::new(transport))
    }
}

/// One `RTCPeerConnection`, wrapped so the session layer only sees the
/// [`PeerTransport`] contract.
pub struct RtcTransport {
    pc: Arc<RTCPeerConnection>,
    tracks: Mutex<mpsc::Receiver<Box<dyn TrackSource>>>,
    closed_tx: watch::Sender<bool>,
    closed_rx: watch::Receiver<bool>,
}

impl RtcTransport {
    pub async fn connect(
        config: &RtcConfig,
        decoders: DecoderRegistry,
    ) -> Result<Self, TransportError> {
        let mut media = MediaEngine::default();
        media
            .register_default_codecs()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        let registry = register_default_interceptors(Registry::new(), &mut media)
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| TransportError::Setup(e.to_string()))?,
        );

        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            Box::pin(async move {
                info!(?state, "peer connection state changed");
            })
        }));

        let (track_tx, track_rx) = mpsc::channel::<Box<dyn TrackSource>>(8);
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let decoders = decoders.clone();
            Box::pin(async move {
                let mime_type = track.codec().capability.mime_type.clone();
                let Some(decoder) = decoders.make(&mime_type) else {
                    warn!(%mime_type, "no frame decoder registered, ignoring track");
                    return;
                };
                let Some(source) = RtcTrack::new(track, decoder) else {
                    warn!(%mime_type, "no depacketizer for codec, ignoring track");
                    return;
                };
                let _ = tx.send(Box::new(source)).await;
            })
        }));

        let (closed_tx, closed_rx) = watch::channel(false);
        Ok(Self {
            pc,
            tracks: Mutex::new(track_rx),
            closed_tx,
            closed_rx,
        })
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn apply_offer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, TransportError> {
        if *self.closed_rx.borrow() {
            return Err(TransportError::Closed);
        }
        if offer.kind != "offer" {
            return Err(TransportError::OfferRejected(format!(
                "expected an offer, got '{}'",
                offer.kind
            )));
        }

        let remote = RTCSessionDescription::offer(offer.sdp)
            .map_err(|e| TransportError::OfferRejected(e.to_string()))?;
        self.pc
            .set_remote_description(remote)
            .await
            .map_err(|e| TransportError::OfferRejected(e.to_string()))?;

        let answer = self
            .pc
            .create_answer(None)
            .await
            .map_err(|e| TransportError::OfferRejected(e.to_string()))?;

        // Clients here do not trickle, so the answer must carry the gathered
        // candidates before it goes out.
        let mut gathered = self.pc.gathering_complete_promise().await;
        self.pc
            .set_local_description(answer)
            .await
            .map_err(|e| TransportError::OfferRejected(e.to_string()))?;
        let _ = gathered.recv().await;

        let local = self
            .pc
            .local_description()
            .await
            .ok_or_else(|| TransportError::OfferRejected("no local description".into()))?;

        Ok(SessionDescription {
            sdp: local.sdp,
            kind: local.sdp_type.to_string(),
        })
    }

    async fn accept_track(&self) -> Option<Box<dyn TrackSource>> {
        let mut closed = self.closed_rx.clone();
        if *closed.borrow() {
            return None;
        }
        let mut tracks = self.tracks.lock().await;
        tokio::select! {
            track = tracks.recv() => track,
            _ = closed.changed() => None,
        }
    }

    async fn close(&self) {
        if self.closed_tx.send_replace(true) {
            return;
        }
        debug!("closing peer connection");
        if let Err(e) = self.pc.close().await {
            warn!(error = %e, "peer connection close failed");
        }
    }
}

/// Depacketizer selection for the codecs the media engine negotiates.
enum VideoDepacketizer {
    Vp8(Vp8Packet),
    H264(H264Packet),
}

impl Depacketizer for VideoDepacketizer {
    fn depacketize(&mut self, b: &Bytes) -> Result<Bytes, webrtc::rtp::Error> {
        match self {
            Self::Vp8(d) => d.depacketize(b),
            Self::H264(d) => d.depacketize(b),
        }
    }

    fn is_partition_head(&self, payload: &Bytes) -> bool {
        match self {
            Self::Vp8(d) => d.is_partition_head(payload),
            Self::H264(d) => d.is_partition_head(payload),
        }
    }

    fn is_partition_tail(&self, marker: bool, payload: &Bytes) -> bool {
        match self {
            Self::Vp8(d) => d.is_partition_tail(marker, payload),
            Self::H264(d) => d.is_partition_tail(marker, payload),
        }
    }
}

/// An accepted remote track: RTP in, raw frames out.
struct RtcTrack {
    id: String,
    track: Arc<TrackRemote>,
    samples: SampleBuilder<VideoDepacketizer>,
    decoder: Box<dyn FrameDecoder>,
}

impl RtcTrack {
    fn new(track: Arc<TrackRemote>, decoder: Box<dyn FrameDecoder>) -> Option<Self> {
        let codec = track.codec();
        let mime_type = &codec.capability.mime_type;
        let depacketizer = if mime_type.eq_ignore_ascii_case(MIME_TYPE_VP8) {
            VideoDepacketizer::Vp8(Vp8Packet::default())
        } else if mime_type.eq_ignore_ascii_case(MIME_TYPE_H264) {
            VideoDepacketizer::H264(H264Packet::default())
        } else {
            return None;
        };
        let samples = SampleBuilder::new(128, depacketizer, codec.capability.clock_rate);
        Some(Self {
            id: track.id(),
            track,
            samples,
            decoder,
        })
    }
}

#[async_trait]
impl TrackSource for RtcTrack {
    fn id(&self) -> &str {
        &self.id
    }

    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, TransportError> {
        loop {
            let packet = match self.track.read_rtp().await {
                Ok((packet, _)) => packet,
                Err(webrtc::Error::ErrClosedPipe) => return Ok(None),
                Err(e) => return Err(TransportError::Track(e.to_string())),
            };
            self.samples.push(packet);
            while let Some(sample) = self.samples.pop() {
                if let Some(frame) = self.decoder.decode(sample.data.as_ref())? {
                    return Ok(Some(frame));
                }
            }
        }
    }
}
