use crate::session::SessionManager;
use crate::signaling::ConnectionHandler;
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use std::net::SocketAddr;
use tracing::{error, info};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(manager): State<SessionManager>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        info!(peer = %addr, "signaling client connected");
        match ConnectionHandler::connect(manager, addr.to_string()).await {
            Ok(handler) => handler.run(socket).await,
            Err(e) => error!(peer = %addr, error = %e, "failed to create peer session"),
        }
    })
}
