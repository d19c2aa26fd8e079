use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Wire protocol an upstream is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamProtocol {
    #[default]
    Udp,
    Tcp,
    TcpTls,
    Https,
}

impl UpstreamProtocol {
    pub fn default_port(&self) -> u16 {
        match self {
            UpstreamProtocol::Udp | UpstreamProtocol::Tcp => 53,
            UpstreamProtocol::TcpTls => 853,
            UpstreamProtocol::Https => 443,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamProtocol::Udp => "udp",
            UpstreamProtocol::Tcp => "tcp",
            UpstreamProtocol::TcpTls => "tcp-tls",
            UpstreamProtocol::Https => "https",
        }
    }
}

impl fmt::Display for UpstreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream address that may still need a hostname lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl UpstreamAddr {
    /// Parses `ip`, `ip:port`, `[v6]:port`, `host` or `host:port`.
    pub fn parse(s: &str, default_port: u16) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidUpstream("empty address".to_string()));
        }
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(UpstreamAddr::Resolved(addr));
        }
        if let Ok(ip) = s.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, default_port)));
        }

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| DomainError::InvalidUpstream(format!("invalid port in '{}'", s)))?;
                (host, port)
            }
            None => (s, default_port),
        };

        if host.is_empty() || host.contains(|c: char| c.is_whitespace() || c == '/') {
            return Err(DomainError::InvalidUpstream(format!(
                "invalid host in '{}'",
                s
            )));
        }

        Ok(UpstreamAddr::Unresolved {
            hostname: host.into(),
            port,
        })
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            UpstreamAddr::Resolved(addr) => Some(*addr),
            UpstreamAddr::Unresolved { .. } => None,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            UpstreamAddr::Resolved(addr) => addr.port(),
            UpstreamAddr::Unresolved { port, .. } => *port,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, UpstreamAddr::Unresolved { .. })
    }

    /// Returns (hostname, port) if this address is unresolved.
    pub fn unresolved_parts(&self) -> Option<(&str, u16)> {
        match self {
            UpstreamAddr::Unresolved { hostname, port } => Some((hostname, *port)),
            UpstreamAddr::Resolved(_) => None,
        }
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

/// A descriptor address parsed for its protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamEndpoint {
    Udp {
        addr: UpstreamAddr,
    },
    Tcp {
        addr: UpstreamAddr,
    },
    Tls {
        addr: UpstreamAddr,
        server_name: Arc<str>,
    },
    Https {
        url: Arc<str>,
        hostname: Arc<str>,
    },
}

impl UpstreamEndpoint {
    /// `udp`/`tcp`: `host[:port]`. `tcp-tls`: `host[:port][@server_name]`,
    /// the server name defaulting to the host. `https`: a full URL.
    pub fn parse(protocol: UpstreamProtocol, address: &str) -> Result<Self, DomainError> {
        let address = address.trim();
        match protocol {
            UpstreamProtocol::Udp => Ok(UpstreamEndpoint::Udp {
                addr: UpstreamAddr::parse(address, protocol.default_port())?,
            }),
            UpstreamProtocol::Tcp => Ok(UpstreamEndpoint::Tcp {
                addr: UpstreamAddr::parse(address, protocol.default_port())?,
            }),
            UpstreamProtocol::TcpTls => {
                let (host_port, server_name) = match address.split_once('@') {
                    Some((host_port, name)) if !name.is_empty() => (host_port, Some(name)),
                    Some(_) => {
                        return Err(DomainError::InvalidUpstream(format!(
                            "empty server name in '{}'",
                            address
                        )))
                    }
                    None => (address, None),
                };
                let addr = UpstreamAddr::parse(host_port, protocol.default_port())?;
                let server_name: Arc<str> = match (server_name, &addr) {
                    (Some(name), _) => name.into(),
                    (None, UpstreamAddr::Unresolved { hostname, .. }) => hostname.clone(),
                    (None, UpstreamAddr::Resolved(sock)) => sock.ip().to_string().into(),
                };
                Ok(UpstreamEndpoint::Tls { addr, server_name })
            }
            UpstreamProtocol::Https => {
                let rest = address.strip_prefix("https://").ok_or_else(|| {
                    DomainError::InvalidUpstream(format!(
                        "expected an https:// URL, got '{}'",
                        address
                    ))
                })?;
                let authority = rest.split('/').next().unwrap_or_default();
                let hostname = match authority.rsplit_once(':') {
                    Some((host, port)) if port.parse::<u16>().is_ok() => host,
                    _ => authority,
                };
                if hostname.is_empty() {
                    return Err(DomainError::InvalidUpstream(format!(
                        "missing host in '{}'",
                        address
                    )));
                }
                Ok(UpstreamEndpoint::Https {
                    url: address.into(),
                    hostname: hostname.trim_start_matches('[').trim_end_matches(']').into(),
                })
            }
        }
    }

    pub fn addr(&self) -> Option<&UpstreamAddr> {
        match self {
            UpstreamEndpoint::Udp { addr }
            | UpstreamEndpoint::Tcp { addr }
            | UpstreamEndpoint::Tls { addr, .. } => Some(addr),
            UpstreamEndpoint::Https { .. } => None,
        }
    }

    pub fn protocol(&self) -> UpstreamProtocol {
        match self {
            UpstreamEndpoint::Udp { .. } => UpstreamProtocol::Udp,
            UpstreamEndpoint::Tcp { .. } => UpstreamProtocol::Tcp,
            UpstreamEndpoint::Tls { .. } => UpstreamProtocol::TcpTls,
            UpstreamEndpoint::Https { .. } => UpstreamProtocol::Https,
        }
    }

    /// Returns `true` if a hostname must be looked up before dialing.
    pub fn needs_resolution(&self) -> bool {
        self.addr().is_some_and(UpstreamAddr::is_unresolved)
    }

    /// Copy of this endpoint dialing `resolved` instead of a hostname.
    pub fn with_resolved_addr(&self, resolved: SocketAddr) -> Self {
        match self {
            UpstreamEndpoint::Udp { .. } => UpstreamEndpoint::Udp {
                addr: UpstreamAddr::Resolved(resolved),
            },
            UpstreamEndpoint::Tcp { .. } => UpstreamEndpoint::Tcp {
                addr: UpstreamAddr::Resolved(resolved),
            },
            UpstreamEndpoint::Tls { server_name, .. } => UpstreamEndpoint::Tls {
                addr: UpstreamAddr::Resolved(resolved),
                server_name: server_name.clone(),
            },
            UpstreamEndpoint::Https { .. } => self.clone(),
        }
    }
}

impl fmt::Display for UpstreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamEndpoint::Udp { addr } => write!(f, "udp://{}", addr),
            UpstreamEndpoint::Tcp { addr } => write!(f, "tcp://{}", addr),
            UpstreamEndpoint::Tls { addr, server_name } => {
                write!(f, "tls://{}@{}", addr, server_name)
            }
            UpstreamEndpoint::Https { url, .. } => write!(f, "{}", url),
        }
    }
}
