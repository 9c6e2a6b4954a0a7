use clap::Parser;
use framecast_server::config::ServerConfig;
use framecast_server::media::DecoderRegistry;
use framecast_server::net;
use framecast_server::queue::{self, FrameReceiver};
use framecast_server::server;
use framecast_server::session::SessionManager;
use framecast_server::transport::{RtcConfig, RtcTransportFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    let config = ServerConfig::parse();

    let (frames, receiver) = queue::bounded(config.queue_capacity);

    // Raw-pixel decoders are an external concern; register them here when
    // embedding a codec implementation.
    let decoders = DecoderRegistry::default();
    let factory = Arc::new(RtcTransportFactory::new(RtcConfig::default(), decoders));
    let manager = SessionManager::new(factory, frames);

    print_startup_banner(&config);

    let listener_config = config.clone();
    tokio::spawn(async move {
        if let Err(e) = server::serve(&listener_config, manager).await {
            error!(error = %e, "signaling listener stopped");
            if let Some(remediation) = e.remediation() {
                error!("TLS certificate files are required for the WSS listener");
                error!("generate a self-signed pair with:");
                error!("  {remediation}");
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
        _ = display_stage(receiver) => {}
    }
}

/// Stands in for the on-screen display collaborator: drains the frame queue
/// at its own pace, treating empty-queue timeouts as routine.
async fn display_stage(mut frames: FrameReceiver) {
    let mut delivered: u64 = 0;
    loop {
        match frames.consume(Duration::from_millis(100)).await {
            Some(frame) => {
                delivered += 1;
                if delivered % 300 == 0 {
                    info!(
                        delivered,
                        width = frame.width,
                        height = frame.height,
                        "frames delivered to display stage"
                    );
                }
            }
            None => debug!("no frame within timeout"),
        }
    }
}

fn print_startup_banner(config: &ServerConfig) {
    let local_ip = net::local_ip();
    println!();
    println!("{}", "=".repeat(60));
    println!("      FRAMECAST RELAY SERVER");
    println!("{}", "=".repeat(60));
    println!("  - listening on: wss://{}:{}", local_ip, config.port);
    println!(
        "  - (also reachable at wss://localhost:{} locally)",
        config.port
    );
    println!();
    println!("  For remote publishers:");
    println!(
        "  1. open port {} in this machine's firewall",
        config.port
    );
    println!(
        "  2. visit https://{}:{} once and accept the certificate warning",
        local_ip, config.port
    );
    println!("  3. connect the publisher app to: {local_ip}");
    println!("{}", "=".repeat(60));
    println!();
}
