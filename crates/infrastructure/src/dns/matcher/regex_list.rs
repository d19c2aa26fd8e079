use fancy_regex::Regex;
use splitroute_application::ports::DomainMatcher;
use splitroute_domain::fingerprint::normalize_name;
use splitroute_domain::DomainError;

pub(crate) fn compile(pattern: &str) -> Result<Regex, DomainError> {
    Regex::new(pattern)
        .map_err(|e| DomainError::InvalidMatcherEntry(format!("regex '{}': {}", pattern, e)))
}

/// Names matching any of the patterns, tested in order.
pub struct RegexListMatcher {
    name: String,
    patterns: Vec<Regex>,
}

impl RegexListMatcher {
    pub fn new(name: &str, entries: &[String]) -> Result<Self, DomainError> {
        let patterns = entries
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty() && !entry.starts_with('#'))
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            patterns,
        })
    }
}

impl DomainMatcher for RegexListMatcher {
    fn has(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.patterns
            .iter()
            .any(|re| re.is_match(&name).unwrap_or(false))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
