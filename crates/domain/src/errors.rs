use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR format: {0}")]
    InvalidCidr(String),

    #[error("Invalid upstream: {0}")]
    InvalidUpstream(String),

    #[error("Invalid bootstrap address: {0}")]
    InvalidBootstrapAddress(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Invalid domain matcher entry: {0}")]
    InvalidMatcherEntry(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport connection reset by {server}")]
    TransportConnectionReset { server: String },

    #[error("Transport error talking to {server}: {reason}")]
    TransportFailed { server: String, reason: String },

    #[error("SOCKS5 proxy {proxy} failed: {reason}")]
    Socks5Failed { proxy: String, reason: String },

    #[error("Hostname resolution failed for {0}")]
    ResolutionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No upstream servers configured for {0} group")]
    TransportNoServers(String),

    #[error("All upstream servers are unreachable")]
    TransportAllServersUnreachable,
}

impl DomainError {
    /// Classifies an I/O error raised while talking to `server`.
    pub fn from_io(server: impl Into<String>, err: &std::io::Error) -> Self {
        let server = server.into();
        match err.kind() {
            std::io::ErrorKind::TimedOut => DomainError::TransportTimeout { server },
            std::io::ErrorKind::ConnectionRefused => {
                DomainError::TransportConnectionRefused { server }
            }
            std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted => {
                DomainError::TransportConnectionReset { server }
            }
            _ => DomainError::TransportFailed {
                server,
                reason: err.to_string(),
            },
        }
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::QueryTimeout
                | DomainError::TransportTimeout { .. }
                | DomainError::TransportConnectionRefused { .. }
                | DomainError::TransportConnectionReset { .. }
                | DomainError::TransportFailed { .. }
                | DomainError::Socks5Failed { .. }
                | DomainError::TransportAllServersUnreachable
        )
    }
}
