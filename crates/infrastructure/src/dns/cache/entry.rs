use hickory_proto::op::Message;
use splitroute_application::services::message::set_id;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CachedMessage {
    message: Message,
    expires_at: Instant,
}

impl CachedMessage {
    pub fn new(message: Message, ttl: Duration) -> Self {
        Self {
            message,
            expires_at: Instant::now() + ttl,
        }
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Whole seconds left, rounded up.
    pub fn remaining_secs(&self) -> u32 {
        let left = self.expires_at.saturating_duration_since(Instant::now());
        let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    /// Copy with the caller's id and answer TTLs counted down.
    pub fn to_response(&self, id: u16) -> Message {
        let mut message = self.message.clone();
        set_id(&mut message, id);

        let remaining = self.remaining_secs();
        let mut answers = message.take_answers();
        for record in answers.iter_mut() {
            record.set_ttl(record.ttl().min(remaining));
        }
        message.insert_answers(answers);
        message
    }
}
