use crate::errors::DomainError;
use crate::fingerprint::normalize_name;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAddrs {
    pub v4: Vec<Ipv4Addr>,
    pub v6: Vec<Ipv6Addr>,
}

impl HostAddrs {
    fn push(&mut self, ip: IpAddr) {
        match ip {
            IpAddr::V4(v4) if !self.v4.contains(&v4) => self.v4.push(v4),
            IpAddr::V6(v6) if !self.v6.contains(&v6) => self.v6.push(v6),
            _ => {}
        }
    }
}

/// Static name table: exact names and `*.suffix` wildcards.
///
/// An exact entry beats any wildcard; among wildcards the longest suffix wins.
#[derive(Debug, Clone, Default)]
pub struct HostsTable {
    exact: HashMap<String, HostAddrs>,
    wildcard: HashMap<String, HostAddrs>,
}

impl HostsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses hosts(5) text: `address name [name...]`, `#` comments.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let mut table = Self::new();
        table.extend_from_text(text)?;
        Ok(table)
    }

    pub fn extend_from_text(&mut self, text: &str) -> Result<(), DomainError> {
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(address) = fields.next() else {
                continue;
            };
            let ip: IpAddr = address
                .parse()
                .map_err(|_| DomainError::InvalidIpAddress(address.to_string()))?;

            for name in fields {
                self.insert(name, ip);
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, name: &str, ip: IpAddr) {
        let name = normalize_name(name);
        if let Some(suffix) = name.strip_prefix("*.") {
            self.wildcard
                .entry(suffix.to_string())
                .or_default()
                .push(ip);
        } else if !name.is_empty() {
            self.exact.entry(name).or_default().push(ip);
        }
    }

    pub fn find(&self, name: &str) -> Option<&HostAddrs> {
        let name = normalize_name(name);
        if let Some(addrs) = self.exact.get(&name) {
            return Some(addrs);
        }
        if self.wildcard.is_empty() {
            return None;
        }

        let mut rest = name.as_str();
        while let Some((_, parent)) = rest.split_once('.') {
            if let Some(addrs) = self.wildcard.get(parent) {
                return Some(addrs);
            }
            rest = parent;
        }
        None
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard.is_empty()
    }
}
