use super::handler::DnsServerHandler;
use std::io;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, error};

const MAX_UDP_QUERY_SIZE: usize = 4096;

/// Answers queries on `socket` until it fails. Each query runs on its own
/// task so a slow upstream never blocks the socket.
pub async fn serve_udp(socket: Arc<UdpSocket>, handler: DnsServerHandler) -> io::Result<()> {
    let mut recv_buf = vec![0u8; MAX_UDP_QUERY_SIZE];

    loop {
        let (len, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // ICMP port unreachable from an earlier reply surfaces here on some platforms.
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
            Err(e) => {
                error!(error = %e, "UDP recv error");
                return Err(e);
            }
        };

        let packet: Arc<[u8]> = Arc::from(&recv_buf[..len]);
        let socket = socket.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle_udp(&packet, from.ip()).await {
                if let Err(e) = socket.send_to(&response, from).await {
                    debug!(client = %from, error = %e, "Failed to send UDP response");
                }
            }
        });
    }
}
