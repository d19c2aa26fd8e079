use super::upstream::UpstreamDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Routing policy for the primary/alternative dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DispatchConfig {
    #[serde(default)]
    pub primary_dns: Vec<UpstreamDescriptor>,

    #[serde(default)]
    pub alternative_dns: Vec<UpstreamDescriptor>,

    /// Servers used only to resolve upstream hostnames. Empty falls back to
    /// the system resolver.
    #[serde(default)]
    pub bootstrap_dns: Vec<String>,

    #[serde(default)]
    pub only_primary_dns: bool,

    /// `"alternativeDNS"` (or `"AlternativeDNS"`) sends empty primary
    /// answers to the alternative group.
    #[serde(default)]
    pub when_primary_dns_answer_none_use: String,

    #[serde(default)]
    pub ip_network_primary: Vec<String>,

    #[serde(default)]
    pub ip_network_primary_file: Option<String>,

    #[serde(default)]
    pub ip_network_alternative: Vec<String>,

    #[serde(default)]
    pub ip_network_alternative_file: Option<String>,

    #[serde(default)]
    pub domain_primary: Vec<String>,

    #[serde(default)]
    pub domain_primary_file: Option<String>,

    #[serde(default)]
    pub domain_alternative: Vec<String>,

    #[serde(default)]
    pub domain_alternative_file: Option<String>,

    #[serde(default)]
    pub domain_matcher: MatcherKind,

    #[serde(default)]
    pub redirect_ipv6_record: bool,

    #[serde(default)]
    pub alternative_dns_concurrent: bool,

    #[serde(default)]
    pub minimum_ttl: u32,

    #[serde(default)]
    pub domain_ttl: HashMap<String, u32>,

    #[serde(default)]
    pub domain_ttl_file: Option<String>,

    #[serde(default)]
    pub hosts_file: Option<String>,
}

impl DispatchConfig {
    pub fn falls_back_to_alternative(&self) -> bool {
        is_alternative_spelling(&self.when_primary_dns_answer_none_use)
    }

    pub fn descriptors_mut(&mut self) -> impl Iterator<Item = &mut UpstreamDescriptor> {
        self.primary_dns
            .iter_mut()
            .chain(self.alternative_dns.iter_mut())
    }
}

/// Only the two historical spellings are accepted. The match is exact, not
/// case-insensitive: `alternativedns` keeps the empty primary answer.
pub fn is_alternative_spelling(value: &str) -> bool {
    matches!(value, "alternativeDNS" | "AlternativeDNS")
}

/// Domain list implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatcherKind {
    FullList,
    FullMap,
    #[default]
    SuffixTree,
    RegexList,
    MixList,
    Final,
}

impl MatcherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatcherKind::FullList => "full-list",
            MatcherKind::FullMap => "full-map",
            MatcherKind::SuffixTree => "suffix-tree",
            MatcherKind::RegexList => "regex-list",
            MatcherKind::MixList => "mix-list",
            MatcherKind::Final => "final",
        }
    }
}
