use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Attempts a transport-layer connect on one port.
///
/// Only an established connection counts; refusals and timeouts are both
/// failures here, the caller moves on to the next port.
pub async fn connect_probe(addr: Ipv4Addr, port: u16, probe_timeout: Duration) -> bool {
    let socket_addr: SocketAddr = SocketAddr::new(IpAddr::V4(addr), port);
    matches!(
        timeout(probe_timeout, TcpStream::connect(socket_addr)).await,
        Ok(Ok(_))
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connect_probe_succeeds_against_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let reachable = connect_probe(
            Ipv4Addr::new(127, 0, 0, 1),
            port,
            Duration::from_millis(500),
        )
        .await;

        assert!(reachable);
    }

    #[tokio::test]
    async fn connect_probe_fails_on_closed_port() {
        // Bind and drop to get a port that is almost certainly closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let reachable = connect_probe(
            Ipv4Addr::new(127, 0, 0, 1),
            port,
            Duration::from_millis(500),
        )
        .await;

        assert!(!reachable);
    }

    #[tokio::test]
    #[ignore]
    async fn connect_probe_times_out_on_unroutable_ip() {
        let reachable = connect_probe(
            Ipv4Addr::new(203, 0, 113, 1),
            443,
            Duration::from_millis(200),
        )
        .await;

        assert!(!reachable);
    }
}
