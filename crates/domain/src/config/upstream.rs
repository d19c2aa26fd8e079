use crate::dns_protocol::{UpstreamEndpoint, UpstreamProtocol};
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// One configured upstream DNS server.
///
/// Deserialized with gaps; [`UpstreamDescriptor::normalize`] fills the
/// protocol, timeout and EDNS client subnet policy before any resolver is
/// built from it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UpstreamDescriptor {
    #[serde(default)]
    pub name: String,

    pub address: String,

    #[serde(default)]
    pub protocol: Option<UpstreamProtocol>,

    #[serde(default)]
    pub socks5_address: Option<String>,

    /// Seconds; 0 means "use the default".
    #[serde(default)]
    pub timeout: u64,

    #[serde(default)]
    pub edns_client_subnet: Option<EdnsClientSubnet>,

    #[serde(default)]
    pub tcp_pool_config: TcpPoolConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EdnsClientSubnet {
    #[serde(default = "default_ecs_policy")]
    pub policy: String,

    #[serde(default)]
    pub external_ip: String,

    #[serde(default)]
    pub no_cookie: bool,
}

impl Default for EdnsClientSubnet {
    fn default() -> Self {
        Self {
            policy: default_ecs_policy(),
            external_ip: String::new(),
            no_cookie: false,
        }
    }
}

/// Idle connection reuse for stream protocols (`tcp`, `tcp-tls`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TcpPoolConfig {
    #[serde(default)]
    pub enable: bool,

    #[serde(default)]
    pub initial_capacity: usize,

    #[serde(default = "default_pool_max_capacity")]
    pub max_capacity: usize,

    /// Seconds an idle connection may stay in the pool.
    #[serde(default = "default_pool_idle_timeout")]
    pub idle_timeout: u64,
}

impl Default for TcpPoolConfig {
    fn default() -> Self {
        Self {
            enable: false,
            initial_capacity: 0,
            max_capacity: default_pool_max_capacity(),
            idle_timeout: default_pool_idle_timeout(),
        }
    }
}

impl UpstreamDescriptor {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            protocol: None,
            socks5_address: None,
            timeout: 0,
            edns_client_subnet: None,
            tcp_pool_config: TcpPoolConfig::default(),
        }
    }

    pub fn with_protocol(mut self, protocol: UpstreamProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Fills defaults in place. Already-set fields are left untouched, so a
    /// second call is a no-op.
    pub fn normalize(&mut self) {
        if self.protocol.is_none() {
            self.protocol = Some(UpstreamProtocol::Udp);
        }

        if self.timeout == 0 {
            self.timeout = DEFAULT_TIMEOUT_SECS;
        }

        if self.edns_client_subnet.is_none() {
            self.edns_client_subnet = Some(EdnsClientSubnet::default());
        }

        if self.name.is_empty() {
            self.name = self.address.clone();
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn is_normalized(&self) -> bool {
        self.protocol.is_some() && self.timeout != 0 && self.edns_client_subnet.is_some()
    }

    pub fn protocol(&self) -> UpstreamProtocol {
        self.protocol.unwrap_or_default()
    }

    pub fn timeout_duration(&self) -> Duration {
        let secs = if self.timeout == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout
        };
        Duration::from_secs(secs)
    }

    pub fn endpoint(&self) -> Result<UpstreamEndpoint, DomainError> {
        UpstreamEndpoint::parse(self.protocol(), &self.address)
    }
}

fn default_ecs_policy() -> String {
    "auto".to_string()
}

fn default_pool_max_capacity() -> usize {
    15
}

fn default_pool_idle_timeout() -> u64 {
    30
}
