use super::pool::StreamPool;
use super::{socks5, DnsTransport, TransportResponse};
use async_trait::async_trait;
use splitroute_domain::{DomainError, TcpPoolConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    server_addr: SocketAddr,
    socks5_address: Option<String>,
    pool: StreamPool<TcpStream>,
}

impl TcpTransport {
    pub fn new(
        server_addr: SocketAddr,
        socks5_address: Option<String>,
        pool_config: &TcpPoolConfig,
    ) -> Self {
        Self {
            server_addr,
            socks5_address,
            pool: StreamPool::new(pool_config),
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    async fn exchange_on(
        &self,
        stream: &mut TcpStream,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        let server = self.server_addr.to_string();
        tokio::time::timeout(timeout, async {
            send_with_length_prefix(stream, message_bytes, &server).await?;
            read_with_length_prefix(stream, &server).await
        })
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: server.clone(),
        })?
    }
}

/// Dials `server_addr`, through the SOCKS5 proxy when one is set.
pub(crate) async fn connect_stream(
    server_addr: SocketAddr,
    socks5_address: Option<&str>,
    timeout: Duration,
) -> Result<TcpStream, DomainError> {
    let server = server_addr.to_string();

    let stream = match socks5_address {
        Some(proxy) => socks5::connect(proxy, server_addr, timeout).await?,
        None => tokio::time::timeout(timeout, TcpStream::connect(server_addr))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.clone(),
            })?
            .map_err(|e| DomainError::from_io(&server, &e))?,
    };

    stream
        .set_nodelay(true)
        .map_err(|e| DomainError::from_io(&server, &e))?;

    Ok(stream)
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if let Some(mut stream) = self.pool.take() {
            match self.exchange_on(&mut stream, message_bytes, timeout).await {
                Ok(bytes) => {
                    debug!(server = %self.server_addr, "TCP query via pooled connection");
                    self.pool.put(stream);
                    return Ok(TransportResponse {
                        bytes,
                        protocol_used: "TCP",
                    });
                }
                Err(_) => {
                    debug!(server = %self.server_addr, "Pooled TCP connection stale, reconnecting");
                }
            }
        }

        let mut stream =
            connect_stream(self.server_addr, self.socks5_address.as_deref(), timeout).await?;

        debug!(
            server = %self.server_addr,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let bytes = self.exchange_on(&mut stream, message_bytes, timeout).await?;

        debug!(
            server = %self.server_addr,
            response_len = bytes.len(),
            "TCP response received"
        );

        self.pool.put(stream);

        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
    server: &str,
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    if message_bytes.len() > MAX_TCP_MESSAGE_SIZE {
        return Err(DomainError::TransportFailed {
            server: server.to_string(),
            reason: format!("query too large: {} bytes", message_bytes.len()),
        });
    }

    let length_bytes = (message_bytes.len() as u16).to_be_bytes();

    stream
        .write_all(&length_bytes)
        .await
        .map_err(|e| DomainError::from_io(server, &e))?;
    stream
        .write_all(message_bytes)
        .await
        .map_err(|e| DomainError::from_io(server, &e))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::from_io(server, &e))?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(
    stream: &mut S,
    server: &str,
) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| DomainError::from_io(server, &e))?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| DomainError::from_io(server, &e))?;

    Ok(response)
}
