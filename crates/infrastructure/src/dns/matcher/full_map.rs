use super::clean_entries;
use compact_str::CompactString;
use rustc_hash::FxHashSet;
use splitroute_application::ports::DomainMatcher;
use splitroute_domain::fingerprint::normalize_name;

/// Hash lookup over exact names.
pub struct FullMapMatcher {
    name: String,
    domains: FxHashSet<CompactString>,
}

impl FullMapMatcher {
    pub fn new(name: &str, entries: &[String]) -> Self {
        Self {
            name: name.to_string(),
            domains: clean_entries(entries).map(CompactString::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl DomainMatcher for FullMapMatcher {
    fn has(&self, name: &str) -> bool {
        self.domains.contains(normalize_name(name).as_str())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
