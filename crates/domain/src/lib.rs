//! Splitroute domain layer
pub mod config;
pub mod dns_protocol;
pub mod errors;
pub mod fingerprint;
pub mod hosts;
pub mod ip_network_set;

pub use config::{
    CacheConfig, CliOverrides, Config, ConfigError, DispatchConfig, EdnsClientSubnet, LocalDnsRecord,
    LoggingConfig, MatcherKind, ServerConfig, TcpPoolConfig, UpstreamDescriptor,
};
pub use dns_protocol::{UpstreamAddr, UpstreamEndpoint, UpstreamProtocol};
pub use errors::DomainError;
pub use fingerprint::Fingerprint;
pub use hosts::{HostAddrs, HostsTable};
pub use ip_network_set::IpNetworkSet;
