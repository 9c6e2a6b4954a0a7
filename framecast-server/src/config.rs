use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Static server configuration, read once at startup. Nothing here is
/// reconfigurable at runtime.
#[derive(Debug, Clone, Parser)]
#[command(name = "framecast-server", about = "WebRTC video relay server")]
pub struct ServerConfig {
    /// Address the signaling listener binds to.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port of the secure WebSocket (WSS) signaling listener.
    #[arg(long, default_value_t = 5001)]
    pub port: u16,

    /// PEM certificate for the signaling listener.
    #[arg(long, default_value = "cert.pem")]
    pub cert_file: PathBuf,

    /// PEM private key for the signaling listener.
    #[arg(long, default_value = "key.pem")]
    pub key_file: PathBuf,

    /// Frame queue capacity. Producers block while the queue is full.
    #[arg(long, default_value_t = 30)]
    pub queue_capacity: usize,

    /// Width of the display window fed by the frame queue.
    #[arg(long, default_value_t = 1280)]
    pub display_width: u32,

    /// Height of the display window fed by the frame queue.
    #[arg(long, default_value_t = 720)]
    pub display_height: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5001,
            cert_file: PathBuf::from("cert.pem"),
            key_file: PathBuf::from("key.pem"),
            queue_capacity: 30,
            display_width: 1280,
            display_height: 720,
        }
    }
}
