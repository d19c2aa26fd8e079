//! DNS-over-HTTPS transport (RFC 8484).
//!
//! Queries are POSTed as `application/dns-message`; the response body is the
//! raw DNS reply. When the bootstrap resolver pinned an address for the URL
//! host, the client connects there instead of asking the system resolver.

use super::{DnsTransport, TransportOptions, TransportResponse};
use async_trait::async_trait;
use splitroute_domain::DomainError;
use std::time::Duration;
use tracing::{debug, warn};

const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

pub struct HttpsTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpsTransport {
    pub fn new(
        url: String,
        hostname: &str,
        options: &TransportOptions,
    ) -> Result<Self, DomainError> {
        if options.socks5_address.is_some() {
            warn!(url = %url, "SOCKS5 proxy is not supported for HTTPS upstreams, connecting directly");
        }

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(4)
            .http2_prior_knowledge();

        if let Some(addr) = options.https_resolved {
            builder = builder.resolve(hostname, addr);
        }

        let client = builder.build().map_err(|e| {
            DomainError::InvalidUpstream(format!("failed to build HTTPS client for {}: {}", url, e))
        })?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        debug!(
            url = %self.url,
            message_len = message_bytes.len(),
            "Sending DoH query"
        );

        let deadline = tokio::time::Instant::now() + timeout;

        let response = tokio::time::timeout_at(
            deadline,
            self.client
                .post(&self.url)
                .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
                .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
                .body(message_bytes.to_vec())
                .send(),
        )
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: self.url.clone(),
        })?
        .map_err(|e| DomainError::TransportFailed {
            server: self.url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::TransportFailed {
                server: self.url.clone(),
                reason: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let response_bytes = tokio::time::timeout_at(deadline, response.bytes())
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.url.clone(),
            })?
            .map_err(|e| DomainError::TransportFailed {
                server: self.url.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            url = %self.url,
            response_len = response_bytes.len(),
            "DoH response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes.to_vec(),
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
