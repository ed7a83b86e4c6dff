use std::net::{IpAddr, Ipv4Addr};

use tokio::net::UdpSocket;
use tracing::debug;

/// Address other devices on the LAN can reach this host on.
///
/// "Connecting" a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface, whose address is then read back. Falls back to
/// loopback when there is no route.
pub async fn discover_local_ip() -> IpAddr {
    match probe().await {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            debug!(error = %e, "Cannot determine LAN address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

async fn probe() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.connect(("10.255.255.255", 1)).await?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_yields_an_ipv4_address() {
        let ip = discover_local_ip().await;
        assert!(ip.is_ipv4());
        assert!(!ip.is_unspecified());
    }
}
