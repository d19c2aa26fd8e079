use super::forwarding::{MessageBuilder, ResponseParser};
use super::transport::tcp::TcpTransport;
use super::transport::{create_transport, DnsTransport, Transport, TransportOptions};
use async_trait::async_trait;
use hickory_proto::op::Message;
use splitroute_application::ports::{BootstrapResolver, UpstreamResolver};
use splitroute_application::services::message::set_id;
use splitroute_domain::{DomainError, UpstreamDescriptor, UpstreamEndpoint};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

const HTTPS_DEFAULT_PORT: u16 = 443;

struct Connection {
    transport: Transport,
    /// Retry path for truncated UDP replies.
    tcp_fallback: Option<TcpTransport>,
}

/// An upstream built from one descriptor.
///
/// Hostnames are looked up on the first exchange, through the bootstrap
/// resolver when one is configured and the system resolver otherwise. The
/// result is kept for the lifetime of the resolver.
pub struct DnsUpstreamResolver {
    name: String,
    endpoint: UpstreamEndpoint,
    options: TransportOptions,
    timeout: Duration,
    bootstrap: Option<Arc<dyn BootstrapResolver>>,
    connection: OnceCell<Connection>,
}

impl DnsUpstreamResolver {
    pub fn new(
        descriptor: &UpstreamDescriptor,
        bootstrap: Option<Arc<dyn BootstrapResolver>>,
    ) -> Result<Self, DomainError> {
        let endpoint = descriptor.endpoint()?;
        let options = TransportOptions {
            socks5_address: descriptor
                .socks5_address
                .clone()
                .filter(|address| !address.is_empty()),
            tcp_pool: descriptor.tcp_pool_config.clone(),
            https_resolved: None,
        };

        Ok(Self {
            name: descriptor.name.clone(),
            endpoint,
            options,
            timeout: descriptor.timeout_duration(),
            bootstrap,
            connection: OnceCell::new(),
        })
    }

    pub fn endpoint(&self) -> &UpstreamEndpoint {
        &self.endpoint
    }

    async fn lookup(&self, hostname: &str, port: u16) -> Result<SocketAddr, DomainError> {
        let addrs: Vec<SocketAddr> = match &self.bootstrap {
            Some(bootstrap) => bootstrap.resolve(hostname, port).await?,
            None => tokio::net::lookup_host((hostname, port))
                .await
                .map_err(|e| {
                    DomainError::ResolutionFailed(format!("{}: {}", hostname, e))
                })?
                .collect(),
        };

        let addr = addrs
            .first()
            .copied()
            .ok_or_else(|| DomainError::ResolutionFailed(hostname.to_string()))?;

        debug!(upstream = %self.name, hostname = %hostname, resolved = %addr, "Upstream hostname resolved");
        Ok(addr)
    }

    async fn connect(&self) -> Result<Connection, DomainError> {
        let mut options = self.options.clone();

        let endpoint = match &self.endpoint {
            UpstreamEndpoint::Https { hostname, .. } => {
                if self.bootstrap.is_some() && hostname.parse::<IpAddr>().is_err() {
                    options.https_resolved = Some(self.lookup(hostname, HTTPS_DEFAULT_PORT).await?);
                }
                self.endpoint.clone()
            }
            endpoint => match endpoint.addr().and_then(|addr| addr.unresolved_parts()) {
                Some((hostname, port)) => {
                    let resolved = self.lookup(hostname, port).await?;
                    endpoint.with_resolved_addr(resolved)
                }
                None => endpoint.clone(),
            },
        };

        let tcp_fallback = match &endpoint {
            UpstreamEndpoint::Udp { addr } => addr.socket_addr().map(|addr| {
                TcpTransport::new(addr, options.socks5_address.clone(), &options.tcp_pool)
            }),
            _ => None,
        };

        Ok(Connection {
            transport: create_transport(&endpoint, &options)?,
            tcp_fallback,
        })
    }

    async fn exchange_inner(&self, query: &Message) -> Result<Message, DomainError> {
        let connection = self.connection.get_or_try_init(|| self.connect()).await?;

        let mut outgoing = query.clone();
        let id = fastrand::u16(..);
        set_id(&mut outgoing, id);
        let bytes = MessageBuilder::encode(&outgoing)?;

        let response = connection.transport.send(&bytes, self.timeout).await?;
        let mut message = ResponseParser::parse(&response.bytes, id)?;

        if message.truncated() {
            if let Some(tcp) = &connection.tcp_fallback {
                debug!(upstream = %self.name, "Truncated UDP response, retrying over TCP");
                let response = tcp.send(&bytes, self.timeout).await?;
                message = ResponseParser::parse(&response.bytes, id)?;
            }
        }

        set_id(&mut message, query.id());
        Ok(message)
    }
}

#[async_trait]
impl UpstreamResolver for DnsUpstreamResolver {
    async fn exchange(&self, query: &Message) -> Result<Message, DomainError> {
        tokio::time::timeout(self.timeout, self.exchange_inner(query))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.name.clone(),
            })?
    }

    fn name(&self) -> &str {
        &self.name
    }
}
