use crate::errors::DomainError;
use ipnetwork::IpNetwork;
use std::net::IpAddr;
use tracing::debug;

/// Read-only set of CIDR ranges used to classify answer addresses.
#[derive(Debug, Clone, Default)]
pub struct IpNetworkSet {
    networks: Vec<IpNetwork>,
}

impl IpNetworkSet {
    pub fn new(networks: Vec<IpNetwork>) -> Self {
        Self { networks }
    }

    /// Parses CIDR strings; a bare address becomes a host route.
    pub fn parse<I, S>(entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let networks = entries
            .into_iter()
            .map(|entry| {
                let entry = entry.as_ref().trim();
                entry
                    .parse::<IpNetwork>()
                    .map_err(|_| DomainError::InvalidCidr(entry.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { networks })
    }

    pub fn contains(&self, ip: IpAddr, log_enabled: bool, label: &str) -> bool {
        match self.networks.iter().find(|network| network.contains(ip)) {
            Some(network) => {
                if log_enabled {
                    debug!(ip = %ip, network = %network, set = label, "Matched IP network");
                }
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
