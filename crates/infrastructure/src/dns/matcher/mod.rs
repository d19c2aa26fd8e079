//! Domain list matchers, one per `domain_matcher` kind.

mod final_matcher;
mod full_list;
mod full_map;
mod mix_list;
mod regex_list;
mod suffix_trie;

pub use final_matcher::FinalMatcher;
pub use full_list::FullListMatcher;
pub use full_map::FullMapMatcher;
pub use mix_list::MixListMatcher;
pub use regex_list::RegexListMatcher;
pub use suffix_trie::{SuffixTrie, SuffixTreeMatcher};

use splitroute_application::ports::DomainMatcher;
use splitroute_domain::fingerprint::normalize_name;
use splitroute_domain::{DomainError, MatcherKind};
use std::sync::Arc;
use tracing::debug;

/// Builds the matcher `kind` over `entries`. `name` labels it in logs.
pub fn build_matcher(
    kind: MatcherKind,
    name: &str,
    entries: &[String],
) -> Result<Arc<dyn DomainMatcher>, DomainError> {
    let matcher: Arc<dyn DomainMatcher> = match kind {
        MatcherKind::FullList => Arc::new(FullListMatcher::new(name, entries)),
        MatcherKind::FullMap => Arc::new(FullMapMatcher::new(name, entries)),
        MatcherKind::SuffixTree => Arc::new(SuffixTreeMatcher::new(name, entries)),
        MatcherKind::RegexList => Arc::new(RegexListMatcher::new(name, entries)?),
        MatcherKind::MixList => Arc::new(MixListMatcher::new(name, entries)?),
        MatcherKind::Final => Arc::new(FinalMatcher::new(name)),
    };

    debug!(matcher = %name, kind = kind.as_str(), entries = entries.len(), "Domain matcher built");
    Ok(matcher)
}

/// Trimmed, lowercased entries with blanks and comments removed.
pub(crate) fn clean_entries(entries: &[String]) -> impl Iterator<Item = String> + '_ {
    entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty() && !entry.starts_with('#'))
        .map(normalize_name)
}
