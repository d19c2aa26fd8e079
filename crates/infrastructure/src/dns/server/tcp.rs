use super::handler::DnsServerHandler;
use crate::dns::transport::tcp::{read_with_length_prefix, send_with_length_prefix};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error};

const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts connections on `listener`; each connection may carry several
/// length-prefixed queries and is closed on the first unparsable one.
pub async fn serve_tcp(listener: TcpListener, handler: DnsServerHandler) -> io::Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(error = %e, "TCP accept error");
                return Err(e);
            }
        };

        let handler = handler.clone();
        tokio::spawn(async move {
            serve_connection(stream, peer, handler).await;
        });
    }
}

async fn serve_connection(mut stream: TcpStream, peer: SocketAddr, handler: DnsServerHandler) {
    let client = peer.to_string();

    loop {
        let query = match tokio::time::timeout(
            TCP_IDLE_TIMEOUT,
            read_with_length_prefix(&mut stream, &client),
        )
        .await
        {
            Ok(Ok(query)) => query,
            Ok(Err(_)) | Err(_) => break,
        };

        let Some(response) = handler.handle_raw(&query, peer.ip()).await else {
            debug!(client = %peer, "Closing TCP connection after unparsable query");
            break;
        };

        if let Err(e) = send_with_length_prefix(&mut stream, &response, &client).await {
            debug!(client = %peer, error = %e, "Failed to send TCP response");
            break;
        }
    }
}
