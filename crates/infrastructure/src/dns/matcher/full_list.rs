use super::clean_entries;
use splitroute_application::ports::DomainMatcher;
use splitroute_domain::fingerprint::normalize_name;

/// Linear scan over exact names.
pub struct FullListMatcher {
    name: String,
    domains: Vec<String>,
}

impl FullListMatcher {
    pub fn new(name: &str, entries: &[String]) -> Self {
        Self {
            name: name.to_string(),
            domains: clean_entries(entries).collect(),
        }
    }
}

impl DomainMatcher for FullListMatcher {
    fn has(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.domains.iter().any(|domain| *domain == name)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
