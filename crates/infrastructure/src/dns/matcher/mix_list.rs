use super::regex_list::compile;
use super::suffix_trie::SuffixTrie;
use aho_corasick::AhoCorasick;
use compact_str::CompactString;
use fancy_regex::Regex;
use rustc_hash::FxHashSet;
use splitroute_application::ports::DomainMatcher;
use splitroute_domain::fingerprint::normalize_name;
use splitroute_domain::DomainError;

/// Entries tagged `full:`, `domain:`, `regex:` or `keyword:`. Untagged
/// entries are `domain:`.
pub struct MixListMatcher {
    name: String,
    full: FxHashSet<CompactString>,
    domains: SuffixTrie,
    patterns: Vec<Regex>,
    keywords: Option<AhoCorasick>,
}

impl MixListMatcher {
    pub fn new(name: &str, entries: &[String]) -> Result<Self, DomainError> {
        let mut full = FxHashSet::default();
        let mut domains = SuffixTrie::new();
        let mut patterns = Vec::new();
        let mut keywords: Vec<String> = Vec::new();

        for entry in entries.iter().map(|entry| entry.trim()) {
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            let (tag, value) = match entry.split_once(':') {
                Some((tag, value)) => (tag, value.trim()),
                None => ("domain", entry),
            };

            match tag {
                "full" => {
                    full.insert(CompactString::from(normalize_name(value)));
                }
                "domain" => domains.insert(&normalize_name(value)),
                "regex" => patterns.push(compile(value)?),
                "keyword" => keywords.push(value.to_ascii_lowercase()),
                other => {
                    return Err(DomainError::InvalidMatcherEntry(format!(
                        "unknown tag '{}' in '{}'",
                        other, entry
                    )))
                }
            }
        }

        let keywords = if keywords.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build(&keywords)
                    .map_err(|e| DomainError::InvalidMatcherEntry(e.to_string()))?,
            )
        };

        Ok(Self {
            name: name.to_string(),
            full,
            domains,
            patterns,
            keywords,
        })
    }
}

impl DomainMatcher for MixListMatcher {
    fn has(&self, name: &str) -> bool {
        let name = normalize_name(name);

        self.full.contains(name.as_str())
            || self.domains.contains(&name)
            || self
                .keywords
                .as_ref()
                .is_some_and(|ac| ac.is_match(name.as_str()))
            || self
                .patterns
                .iter()
                .any(|re| re.is_match(&name).unwrap_or(false))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
