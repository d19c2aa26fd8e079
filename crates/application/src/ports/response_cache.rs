use hickory_proto::op::Message;
use splitroute_domain::Fingerprint;

/// Process-wide response store shared by every query.
pub trait ResponseCache: Send + Sync {
    /// Returns a copy of a live entry with its id set to `id`.
    fn hit(&self, key: &Fingerprint, id: u16) -> Option<Message>;

    /// Stores `message` unless `key` is already present. Entries expire after
    /// the first answer's TTL, or `minimum_ttl` when there are no answers.
    fn insert(&self, key: Fingerprint, message: &Message, minimum_ttl: u32);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
