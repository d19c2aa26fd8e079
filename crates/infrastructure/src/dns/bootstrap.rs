//! Plain-UDP lookups used to find the addresses of hostname upstreams.

use super::forwarding::{MessageBuilder, ResponseParser};
use super::transport::udp::UdpTransport;
use super::transport::DnsTransport;
use async_trait::async_trait;
use hickory_proto::rr::RecordType;
use splitroute_application::ports::BootstrapResolver;
use splitroute_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::debug;

const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_DNS_PORT: u16 = 53;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapServer {
    Addr(SocketAddr),
    /// Looked up through the system resolver on every attempt.
    Host(String, u16),
}

impl BootstrapServer {
    pub async fn socket_addr(&self) -> Result<SocketAddr, DomainError> {
        let (host, port) = match self {
            BootstrapServer::Addr(addr) => return Ok(*addr),
            BootstrapServer::Host(host, port) => (host.as_str(), *port),
        };
        let server = format!("{}:{}", host, port);

        let addrs: Vec<SocketAddr> =
            tokio::time::timeout(BOOTSTRAP_TIMEOUT, tokio::net::lookup_host((host, port)))
                .await
                .map_err(|_| DomainError::TransportTimeout {
                    server: server.clone(),
                })?
                .map_err(|e| DomainError::from_io(server.clone(), &e))?
                .collect();

        // IPv4 first.
        addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or(DomainError::ResolutionFailed(server))
    }
}

/// Picks one configured server at random for every lookup attempt.
pub struct RandomBootstrapResolver {
    servers: Vec<String>,
}

impl RandomBootstrapResolver {
    /// `None` when `servers` is empty.
    pub fn new(servers: Vec<String>) -> Option<Self> {
        if servers.is_empty() {
            return None;
        }
        Some(Self { servers })
    }

    /// A bare IP means port 53; anything else must be `host:port`, where
    /// `host` may be a name.
    pub fn parse_server(server: &str) -> Result<BootstrapServer, DomainError> {
        if let Ok(ip) = server.parse::<IpAddr>() {
            return Ok(BootstrapServer::Addr(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
        }
        if let Ok(addr) = server.parse::<SocketAddr>() {
            return Ok(BootstrapServer::Addr(addr));
        }

        let invalid = || DomainError::InvalidBootstrapAddress(server.to_string());
        let (host, port) = server.rsplit_once(':').ok_or_else(invalid)?;
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        if host.is_empty() || host.contains(':') || host.contains(char::is_whitespace) {
            return Err(invalid());
        }
        Ok(BootstrapServer::Host(host.to_string(), port))
    }

    fn pick(&self) -> &str {
        &self.servers[fastrand::usize(..self.servers.len())]
    }

    async fn lookup(
        &self,
        hostname: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let server = self.pick();
        let server_addr = Self::parse_server(server)?.socket_addr().await?;

        let query = MessageBuilder::build_query(hostname, record_type)?;
        let bytes = MessageBuilder::encode(&query)?;

        let response = UdpTransport::new(server_addr)
            .send(&bytes, BOOTSTRAP_TIMEOUT)
            .await?;
        let message = ResponseParser::parse(&response.bytes, query.id())?;

        let addresses = ResponseParser::addresses(&message);
        debug!(
            bootstrap = %server_addr,
            hostname = %hostname,
            record_type = ?record_type,
            addresses = addresses.len(),
            "Bootstrap lookup finished"
        );
        Ok(addresses)
    }
}

#[async_trait]
impl BootstrapResolver for RandomBootstrapResolver {
    async fn resolve(&self, hostname: &str, port: u16) -> Result<Vec<SocketAddr>, DomainError> {
        if let Ok(ip) = hostname.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        let v4 = self.lookup(hostname, RecordType::A).await;
        let v6 = self.lookup(hostname, RecordType::AAAA).await;

        let mut addrs: Vec<SocketAddr> = Vec::new();
        let mut last_error = None;
        for result in [v4, v6] {
            match result {
                Ok(ips) => addrs.extend(ips.into_iter().map(|ip| SocketAddr::new(ip, port))),
                Err(e) => last_error = Some(e),
            }
        }

        if addrs.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| DomainError::ResolutionFailed(hostname.to_string())));
        }
        Ok(addrs)
    }
}
