use hickory_proto::op::Message;
use rustc_hash::FxHashMap;
use splitroute_domain::fingerprint::normalize_name;

use super::message::question_domain;

/// Answer TTL rewriting shared by the local client and both upstream groups.
#[derive(Debug, Clone, Default)]
pub struct TtlPolicy {
    minimum_ttl: u32,
    domain_ttl: FxHashMap<String, u32>,
}

impl TtlPolicy {
    pub fn new<I>(minimum_ttl: u32, domain_ttl: I) -> Self
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let domain_ttl = domain_ttl
            .into_iter()
            .map(|(domain, ttl)| (normalize_name(&domain), ttl))
            .filter(|(domain, _)| !domain.is_empty())
            .collect();
        Self {
            minimum_ttl,
            domain_ttl,
        }
    }

    pub fn minimum_ttl(&self) -> u32 {
        self.minimum_ttl
    }

    /// Override for `name` from the most specific listed suffix.
    pub fn domain_override(&self, name: &str) -> Option<u32> {
        if self.domain_ttl.is_empty() {
            return None;
        }
        let name = normalize_name(name);
        let mut rest = name.as_str();
        loop {
            if let Some(ttl) = self.domain_ttl.get(rest) {
                return Some(*ttl);
            }
            match rest.split_once('.') {
                Some((_, parent)) => rest = parent,
                None => return None,
            }
        }
    }

    /// TTL an answer for `name` should carry when its upstream said `ttl`.
    pub fn ttl_for(&self, name: &str, ttl: u32) -> u32 {
        if let Some(ttl) = self.domain_override(name) {
            return ttl;
        }
        ttl.max(self.minimum_ttl)
    }

    pub fn apply(&self, message: &mut Message) {
        if message.answers().is_empty() || (self.minimum_ttl == 0 && self.domain_ttl.is_empty()) {
            return;
        }

        let domain = question_domain(message);
        let mut answers = message.take_answers();
        for record in answers.iter_mut() {
            let ttl = self.ttl_for(&domain, record.ttl());
            record.set_ttl(ttl);
        }
        message.insert_answers(answers);
    }
}
