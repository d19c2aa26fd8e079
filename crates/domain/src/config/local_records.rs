use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Inline hosts entry, merged into the hosts table next to `hosts_file`.
///
/// `hostname` may be a wildcard (`*.lan`); `domain` is appended when set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalDnsRecord {
    pub hostname: String,

    #[serde(default)]
    pub domain: Option<String>,

    pub ip: IpAddr,
}

impl LocalDnsRecord {
    pub fn fqdn(&self) -> String {
        match self.domain.as_deref() {
            Some(domain) if !domain.is_empty() => format!(
                "{}.{}",
                self.hostname.trim_end_matches('.'),
                domain.trim_matches('.')
            ),
            _ => self.hostname.trim_end_matches('.').to_string(),
        }
    }
}
