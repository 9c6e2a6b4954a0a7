use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-effort discovery of the local outbound IP, used for the startup
/// banner. Connecting the socket only forces route selection; no datagram is
/// ever sent. Falls back to the loopback address on any failure.
pub fn local_ip() -> IpAddr {
    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn probe() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.connect(("10.255.255.255", 1))?;
    Ok(socket.local_addr()?.ip())
}
