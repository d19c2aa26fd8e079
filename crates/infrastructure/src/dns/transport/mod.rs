pub mod https;
pub mod pool;
pub mod socks5;
pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use splitroute_domain::{DomainError, TcpPoolConfig, UpstreamEndpoint};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Per-upstream knobs that shape how connections are made.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    pub socks5_address: Option<String>,
    pub tcp_pool: TcpPoolConfig,
    /// Pinned address for the HTTPS host, from the bootstrap resolver.
    pub https_resolved: Option<SocketAddr>,
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    #[cfg(feature = "dns-over-rustls")]
    Tls(tls::TlsTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(_) => "TLS",
            #[cfg(feature = "dns-over-https")]
            Self::Https(_) => "HTTPS",
        }
    }
}

fn resolved(endpoint: &UpstreamEndpoint) -> Result<SocketAddr, DomainError> {
    endpoint
        .addr()
        .and_then(|addr| addr.socket_addr())
        .ok_or_else(|| {
            DomainError::InvalidUpstream(format!(
                "transport requires a resolved address, got: {}",
                endpoint
            ))
        })
}

/// Builds the transport for an endpoint whose hostname is already resolved.
pub fn create_transport(
    endpoint: &UpstreamEndpoint,
    options: &TransportOptions,
) -> Result<Transport, DomainError> {
    match endpoint {
        UpstreamEndpoint::Udp { .. } => {
            if options.socks5_address.is_some() {
                tracing::warn!(server = %endpoint, "SOCKS5 proxy is ignored for UDP upstreams");
            }
            Ok(Transport::Udp(udp::UdpTransport::new(resolved(endpoint)?)))
        }
        UpstreamEndpoint::Tcp { .. } => Ok(Transport::Tcp(tcp::TcpTransport::new(
            resolved(endpoint)?,
            options.socks5_address.clone(),
            &options.tcp_pool,
        ))),

        #[cfg(feature = "dns-over-rustls")]
        UpstreamEndpoint::Tls { server_name, .. } => Ok(Transport::Tls(tls::TlsTransport::new(
            resolved(endpoint)?,
            server_name.to_string(),
            options.socks5_address.clone(),
            &options.tcp_pool,
        ))),

        #[cfg(not(feature = "dns-over-rustls"))]
        UpstreamEndpoint::Tls { .. } => {
            let addr = resolved(endpoint)?;
            tracing::warn!("TLS feature not enabled, falling back to TCP for {}", addr);
            Ok(Transport::Tcp(tcp::TcpTransport::new(
                addr,
                options.socks5_address.clone(),
                &options.tcp_pool,
            )))
        }

        #[cfg(feature = "dns-over-https")]
        UpstreamEndpoint::Https { url, hostname } => Ok(Transport::Https(
            https::HttpsTransport::new(url.to_string(), hostname, options)?,
        )),

        #[cfg(not(feature = "dns-over-https"))]
        UpstreamEndpoint::Https { url, .. } => Err(DomainError::InvalidUpstream(format!(
            "HTTPS feature not enabled. Enable 'dns-over-https' feature to use: {}",
            url
        ))),
    }
}
