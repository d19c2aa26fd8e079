//! Minimal SOCKS5 CONNECT client (RFC 1928), no authentication.

use splitroute_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const SOCKS_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const CMD_CONNECT: u8 = 0x01;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

/// Opens a TCP stream to `target` through the proxy at `proxy` (`host:port`).
pub async fn connect(
    proxy: &str,
    target: SocketAddr,
    timeout: Duration,
) -> Result<TcpStream, DomainError> {
    tokio::time::timeout(timeout, handshake(proxy, target))
        .await
        .map_err(|_| DomainError::Socks5Failed {
            proxy: proxy.to_string(),
            reason: "timed out".to_string(),
        })?
}

fn failed(proxy: &str, reason: impl Into<String>) -> DomainError {
    DomainError::Socks5Failed {
        proxy: proxy.to_string(),
        reason: reason.into(),
    }
}

async fn handshake(proxy: &str, target: SocketAddr) -> Result<TcpStream, DomainError> {
    let mut stream = TcpStream::connect(proxy)
        .await
        .map_err(|e| failed(proxy, e.to_string()))?;
    let io = |e: std::io::Error| failed(proxy, e.to_string());

    stream
        .write_all(&[SOCKS_VERSION, 0x01, METHOD_NO_AUTH])
        .await
        .map_err(io)?;

    let mut method = [0u8; 2];
    stream.read_exact(&mut method).await.map_err(io)?;
    if method[0] != SOCKS_VERSION {
        return Err(failed(proxy, "bad version"));
    }
    if method[1] != METHOD_NO_AUTH {
        return Err(failed(proxy, "no acceptable methods"));
    }

    let mut request = Vec::with_capacity(22);
    request.extend_from_slice(&[SOCKS_VERSION, CMD_CONNECT, 0x00]);
    match target.ip() {
        IpAddr::V4(v4) => {
            request.push(ATYP_IPV4);
            request.extend_from_slice(&v4.octets());
        }
        IpAddr::V6(v6) => {
            request.push(ATYP_IPV6);
            request.extend_from_slice(&v6.octets());
        }
    }
    request.extend_from_slice(&target.port().to_be_bytes());
    stream.write_all(&request).await.map_err(io)?;

    let mut head = [0u8; 4];
    stream.read_exact(&mut head).await.map_err(io)?;
    if head[1] != 0x00 {
        return Err(failed(proxy, format!("connect failed, rep={:02x}", head[1])));
    }

    // Consume BND.ADDR and BND.PORT.
    let remaining = match head[3] {
        ATYP_IPV4 => 4 + 2,
        ATYP_IPV6 => 16 + 2,
        ATYP_DOMAIN => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await.map_err(io)?;
            len[0] as usize + 2
        }
        _ => return Err(failed(proxy, "bad atyp")),
    };
    let mut bound = vec![0u8; remaining];
    stream.read_exact(&mut bound).await.map_err(io)?;

    debug!(proxy = %proxy, target = %target, "SOCKS5 tunnel established");
    Ok(stream)
}
