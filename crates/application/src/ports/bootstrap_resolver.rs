use async_trait::async_trait;
use splitroute_domain::DomainError;
use std::net::SocketAddr;

/// Looks up upstream hostnames without going through the upstreams themselves.
#[async_trait]
pub trait BootstrapResolver: Send + Sync {
    async fn resolve(&self, hostname: &str, port: u16) -> Result<Vec<SocketAddr>, DomainError>;
}
