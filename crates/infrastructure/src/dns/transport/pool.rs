use splitroute_domain::TcpPoolConfig;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct IdleStream<S> {
    stream: S,
    since: Instant,
}

/// Idle stream connections for one upstream.
///
/// Streams older than the idle timeout are dropped on the next checkout.
/// A disabled pool hands nothing out and keeps nothing.
pub struct StreamPool<S> {
    idle: Mutex<Vec<IdleStream<S>>>,
    enabled: bool,
    max_idle: usize,
    idle_timeout: Duration,
}

impl<S> StreamPool<S> {
    pub fn new(config: &TcpPoolConfig) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(config.initial_capacity)),
            enabled: config.enable && config.max_capacity > 0,
            max_idle: config.max_capacity,
            idle_timeout: Duration::from_secs(config.idle_timeout),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn take(&self) -> Option<S> {
        if !self.enabled {
            return None;
        }
        let mut idle = self.idle.lock().ok()?;
        while let Some(entry) = idle.pop() {
            if entry.since.elapsed() < self.idle_timeout {
                return Some(entry.stream);
            }
        }
        None
    }

    pub fn put(&self, stream: S) {
        if !self.enabled {
            return;
        }
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(IdleStream {
                    stream,
                    since: Instant::now(),
                });
            }
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}
