//! Per-connection signaling state machine:
//! connected → welcome → message loop → closed.

use crate::session::{NegotiationError, PeerSession, SessionManager};
use crate::transport::TransportError;
use axum::extract::ws::{Message, WebSocket};
use framecast_core::{EventPayload, SessionDescription, SignalMessage};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Events that reset the peer session so the next offer negotiates cleanly.
const RESET_EVENTS: [&str; 2] = ["device_changed", "streaming_started"];

/// Handles one signaling connection. Built by an explicit constructor taking
/// the session manager; owns the connection's current peer session.
pub struct ConnectionHandler {
    manager: SessionManager,
    session: Arc<PeerSession>,
    peer: String,
}

impl ConnectionHandler {
    /// Creates the handler and its initial peer session.
    pub async fn connect(
        manager: SessionManager,
        peer: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let session = manager.create().await?;
        Ok(Self {
            manager,
            session,
            peer: peer.into(),
        })
    }

    pub fn session(&self) -> &Arc<PeerSession> {
        &self.session
    }

    /// The greeting sent as soon as the connection is up.
    pub fn welcome() -> SignalMessage {
        SignalMessage::Welcome {
            message: "signaling server connected".into(),
        }
    }

    /// Decodes one wire text frame and dispatches it. Malformed JSON is
    /// logged and skipped; the connection stays open.
    pub async fn handle_text(&mut self, raw: &str) -> Option<SignalMessage> {
        match serde_json::from_str::<SignalMessage>(raw) {
            Ok(msg) => self.handle_message(msg).await,
            Err(e) => {
                error!(peer = %self.peer, error = %e, "failed to decode signaling message");
                None
            }
        }
    }

    /// Dispatches one decoded message, returning the reply to send, if any.
    pub async fn handle_message(&mut self, msg: SignalMessage) -> Option<SignalMessage> {
        match msg {
            SignalMessage::Offer { payload } => self.on_offer(payload).await,
            SignalMessage::Event { payload } => {
                self.on_event(payload).await;
                None
            }
            SignalMessage::Unknown => {
                warn!(peer = %self.peer, "message with unrecognized type, ignoring");
                None
            }
            other => {
                warn!(peer = %self.peer, ?other, "unexpected message from client, ignoring");
                None
            }
        }
    }

    async fn on_offer(&mut self, offer: SessionDescription) -> Option<SignalMessage> {
        if offer.sdp.is_empty() || offer.kind.is_empty() {
            warn!(peer = %self.peer, "incomplete SDP offer, ignoring");
            return None;
        }
        info!(peer = %self.peer, "SDP offer received");

        match self.session.negotiate(offer).await {
            Ok(answer) => {
                info!(peer = %self.peer, "sending SDP answer");
                Some(SignalMessage::Answer { payload: answer })
            }
            Err(NegotiationError::NotStable(state)) => {
                // Races during renegotiation resolve by rejection, not
                // queuing; the client must re-offer.
                warn!(peer = %self.peer, %state, "offer while not stable, rejecting");
                None
            }
            Err(NegotiationError::Transport(e)) => {
                warn!(peer = %self.peer, error = %e, "offer rejected by transport");
                None
            }
        }
    }

    async fn on_event(&mut self, event: EventPayload) {
        info!(peer = %self.peer, event = %event.event_name, "client event received");
        if !RESET_EVENTS.contains(&event.event_name.as_str()) {
            return;
        }

        info!(peer = %self.peer, event = %event.event_name, "restarting peer session for a fresh offer");
        match self.manager.replace(&self.session).await {
            Ok(fresh) => self.session = fresh,
            Err(e) => {
                error!(peer = %self.peer, error = %e, "failed to restart peer session");
            }
        }
    }

    /// Drives the connection to completion, then releases the session. The
    /// message loop reports failure through its result rather than
    /// unwinding, so cleanup runs on every exit path exactly once.
    pub async fn run(mut self, socket: WebSocket) {
        if let Err(e) = self.message_loop(socket).await {
            warn!(peer = %self.peer, error = %e, "signaling connection closed with error");
        }
        self.manager.close(&self.session).await;
        info!(peer = %self.peer, "signaling connection cleaned up");
    }

    async fn message_loop(&mut self, mut socket: WebSocket) -> anyhow::Result<()> {
        let welcome = serde_json::to_string(&Self::welcome())?;
        socket.send(Message::Text(welcome.into())).await?;

        while let Some(received) = socket.recv().await {
            match received? {
                Message::Text(text) => {
                    let Some(reply) = self.handle_text(text.as_str()).await else {
                        continue;
                    };
                    let json = serde_json::to_string(&reply)?;
                    socket.send(Message::Text(json.into())).await?;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }
}
