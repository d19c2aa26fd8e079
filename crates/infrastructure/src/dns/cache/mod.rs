mod entry;
mod message_cache;

pub use entry::CachedMessage;
pub use message_cache::MessageCache;
