//! DNS-over-TLS transport (RFC 7858).
//!
//! The rustls `ClientConfig` is built once and shared so session tickets are
//! reused across upstreams. Idle streams stay in a per-transport pool when
//! the upstream enables one.

use super::pool::StreamPool;
use super::tcp::{connect_stream, read_with_length_prefix, send_with_length_prefix};
use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use rustls::pki_types::ServerName;
use splitroute_domain::{DomainError, TcpPoolConfig};
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    // Both ring and aws-lc-rs end up enabled in the build; rustls refuses to
    // guess between them.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
});

pub struct TlsTransport {
    server_addr: SocketAddr,
    server_name: String,
    socks5_address: Option<String>,
    pool: StreamPool<TlsStream<TcpStream>>,
}

impl TlsTransport {
    pub fn new(
        server_addr: SocketAddr,
        server_name: String,
        socks5_address: Option<String>,
        pool_config: &TcpPoolConfig,
    ) -> Self {
        Self {
            server_addr,
            server_name,
            socks5_address,
            pool: StreamPool::new(pool_config),
        }
    }

    async fn connect_new(&self, timeout: Duration) -> Result<TlsStream<TcpStream>, DomainError> {
        let server = self.server_addr.to_string();
        let connector = tokio_rustls::TlsConnector::from(SHARED_TLS_CONFIG.clone());

        let server_name = ServerName::try_from(self.server_name.clone()).map_err(|e| {
            DomainError::InvalidUpstream(format!(
                "invalid TLS server name '{}': {}",
                self.server_name, e
            ))
        })?;

        let tcp_stream =
            connect_stream(self.server_addr, self.socks5_address.as_deref(), timeout).await?;

        let tls_stream = tokio::time::timeout(timeout, connector.connect(server_name, tcp_stream))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.clone(),
            })?
            .map_err(|e| DomainError::TransportFailed {
                server: server.clone(),
                reason: format!("TLS handshake failed: {}", e),
            })?;

        debug!(server = %self.server_addr, server_name = %self.server_name, "TLS connection established");
        Ok(tls_stream)
    }

    async fn exchange_on(
        &self,
        stream: &mut TlsStream<TcpStream>,
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

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if let Some(mut stream) = self.pool.take() {
            match self.exchange_on(&mut stream, message_bytes, timeout).await {
                Ok(bytes) => {
                    debug!(server = %self.server_addr, "TLS query via pooled connection");
                    self.pool.put(stream);
                    return Ok(TransportResponse {
                        bytes,
                        protocol_used: "TLS",
                    });
                }
                Err(_) => {
                    debug!(server = %self.server_addr, "Pooled TLS connection stale, reconnecting");
                }
            }
        }

        let mut stream = self.connect_new(timeout).await?;
        let bytes = self.exchange_on(&mut stream, message_bytes, timeout).await?;

        debug!(
            server = %self.server_addr,
            response_len = bytes.len(),
            "TLS response received"
        );

        self.pool.put(stream);

        Ok(TransportResponse {
            bytes,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}
