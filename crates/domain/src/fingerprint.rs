use std::fmt;
use std::sync::Arc;

/// Cache key for a query: normalized question name plus record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub domain: Arc<str>,
    pub record_type: u16,
}

impl Fingerprint {
    pub fn new(domain: &str, record_type: u16) -> Self {
        Self {
            domain: normalize_name(domain).into(),
            record_type,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.record_type)
    }
}

/// Lowercases and strips the trailing root dot.
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
