use super::clean_entries;
use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use splitroute_application::ports::DomainMatcher;
use splitroute_domain::fingerprint::normalize_name;
use std::collections::HashMap;

#[derive(Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode, FxBuildHasher>,
    terminal: bool,
}

/// Label trie keyed from the TLD down. An inserted domain covers itself and
/// every name below it.
#[derive(Default)]
pub struct SuffixTrie {
    root: TrieNode,
    len: usize,
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `example.com`, `.example.com` and `*.example.com` alike.
    pub fn insert(&mut self, domain: &str) {
        let domain = domain
            .strip_prefix("*.")
            .unwrap_or(domain)
            .trim_start_matches('.');
        if domain.is_empty() {
            return;
        }

        let mut node = &mut self.root;
        for label in domain.split('.').rev() {
            node = node.children.entry(CompactString::new(label)).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    #[inline]
    pub fn contains(&self, domain: &str) -> bool {
        let labels: SmallVec<[&str; 8]> = domain.split('.').rev().collect();
        let mut node = &self.root;

        for label in labels.iter() {
            match node.children.get(*label) {
                Some(child) => {
                    if child.terminal {
                        return true;
                    }
                    node = child;
                }
                None => return false,
            }
        }

        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct SuffixTreeMatcher {
    name: String,
    trie: SuffixTrie,
}

impl SuffixTreeMatcher {
    pub fn new(name: &str, entries: &[String]) -> Self {
        let mut trie = SuffixTrie::new();
        for entry in clean_entries(entries) {
            trie.insert(&entry);
        }
        Self {
            name: name.to_string(),
            trie,
        }
    }
}

impl DomainMatcher for SuffixTreeMatcher {
    fn has(&self, name: &str) -> bool {
        self.trie.contains(&normalize_name(name))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
