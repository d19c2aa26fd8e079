use super::entry::CachedMessage;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hickory_proto::op::Message;
use rustc_hash::FxBuildHasher;
use splitroute_application::ports::ResponseCache;
use splitroute_domain::Fingerprint;
use std::time::Duration;
use tracing::{debug, info};

/// In-memory response cache shared by both upstream groups.
///
/// A capacity of 0 turns every operation into a no-op. Inserting into a full
/// cache evicts one random entry first.
pub struct MessageCache {
    entries: DashMap<Fingerprint, CachedMessage, FxBuildHasher>,
    capacity: usize,
}

impl MessageCache {
    pub fn new(capacity: usize) -> Self {
        info!(capacity, "Initializing response cache");
        Self {
            entries: DashMap::with_capacity_and_hasher(capacity.min(4096), FxBuildHasher),
            capacity,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn expiry_for(message: &Message, minimum_ttl: u32) -> Duration {
        let ttl = message
            .answers()
            .first()
            .map(|record| record.ttl())
            .unwrap_or(minimum_ttl);
        Duration::from_secs(u64::from(ttl))
    }

    fn evict_one(&self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let victim = self
            .entries
            .iter()
            .nth(fastrand::usize(..len))
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            self.entries.remove(&key);
            debug!(key = %key, "Evicted cache entry");
        }
    }

    /// Drops every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }
}

impl ResponseCache for MessageCache {
    fn hit(&self, key: &Fingerprint, id: u16) -> Option<Message> {
        if !self.is_enabled() {
            return None;
        }

        let response = {
            let entry = self.entries.get(key)?;
            if entry.is_expired() {
                None
            } else {
                Some(entry.to_response(id))
            }
        };

        if response.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired());
            debug!(key = %key, "Cache entry expired");
        }
        response
    }

    fn insert(&self, key: Fingerprint, message: &Message, minimum_ttl: u32) {
        if !self.is_enabled() {
            return;
        }

        let ttl = Self::expiry_for(message, minimum_ttl);
        if ttl.is_zero() {
            return;
        }

        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_one();
        }

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(CachedMessage::new(message.clone(), ttl));
                    debug!(key = %occupied.key(), ttl_secs = ttl.as_secs(), "Cache entry refreshed");
                }
            }
            Entry::Vacant(vacant) => {
                debug!(key = %vacant.key(), ttl_secs = ttl.as_secs(), "Cache insert");
                vacant.insert(CachedMessage::new(message.clone(), ttl));
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
