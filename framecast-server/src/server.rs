//! Secure WebSocket signaling listener.

use crate::config::ServerConfig;
use crate::session::SessionManager;
use crate::signaling::ws_handler;
use axum::Router;
use axum::routing::get;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("TLS material not found: {} / {}", cert.display(), key.display())]
    TlsMaterial { cert: PathBuf, key: PathBuf },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServeError {
    /// Actionable remediation for a missing-certificate failure: a
    /// copy-pasteable command generating a self-signed pair valid for ten
    /// years, no passphrase, no interactive prompts.
    pub fn remediation(&self) -> Option<String> {
        match self {
            ServeError::TlsMaterial { cert, key } => Some(format!(
                "openssl req -x509 -newkey rsa:2048 -keyout {} -out {} \
                 -sha256 -days 3650 -nodes -subj \"/CN=localhost\"",
                key.display(),
                cert.display()
            )),
            _ => None,
        }
    }
}

/// Binds the WSS listener and serves signaling connections until the task is
/// dropped. A missing certificate or key is fatal for this listener only.
pub async fn serve(config: &ServerConfig, manager: SessionManager) -> Result<(), ServeError> {
    if !config.cert_file.exists() || !config.key_file.exists() {
        return Err(ServeError::TlsMaterial {
            cert: config.cert_file.clone(),
            key: config.key_file.clone(),
        });
    }
    let tls = RustlsConfig::from_pem_file(&config.cert_file, &config.key_file).await?;

    let app = Router::new()
        .route("/", get(ws_handler))
        .with_state(manager);

    let addr = SocketAddr::new(config.host, config.port);
    info!("secure signaling listener on wss://{addr}");

    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_tls_material_fails_with_remediation() {
        let config = ServerConfig {
            cert_file: PathBuf::from("/nonexistent/cert.pem"),
            key_file: PathBuf::from("/nonexistent/key.pem"),
            ..ServerConfig::default()
        };
        let (frames, _rx) = crate::queue::bounded(1);
        let factory = std::sync::Arc::new(crate::transport::RtcTransportFactory::new(
            crate::transport::RtcConfig::default(),
            crate::media::DecoderRegistry::default(),
        ));
        let manager = SessionManager::new(factory, frames);

        let err = serve(&config, manager).await.expect_err("must fail");
        let remediation = err.remediation().expect("remediation text");
        assert!(remediation.contains("openssl req"));
        assert!(remediation.contains("/nonexistent/cert.pem"));
    }
}
