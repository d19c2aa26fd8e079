use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of cached responses. 0 disables caching.
    #[serde(default = "default_cache_size")]
    pub size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size: default_cache_size(),
        }
    }
}

fn default_cache_size() -> usize {
    4096
}
