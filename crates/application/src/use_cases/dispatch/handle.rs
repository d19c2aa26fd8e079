use arc_swap::ArcSwap;
use hickory_proto::op::Message;
use std::net::IpAddr;
use std::sync::Arc;

use super::Dispatcher;

/// Current dispatcher snapshot for the serving side.
///
/// A reload builds a whole new [`Dispatcher`] and swaps it in; queries that
/// already loaded the old snapshot finish on it.
pub struct DispatcherHandle {
    current: ArcSwap<Dispatcher>,
}

impl DispatcherHandle {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            current: ArcSwap::from_pointee(dispatcher),
        }
    }

    pub fn current(&self) -> Arc<Dispatcher> {
        self.current.load_full()
    }

    pub fn replace(&self, dispatcher: Dispatcher) {
        self.current.store(Arc::new(dispatcher));
    }

    pub async fn exchange(&self, query: &Message, inbound_ip: IpAddr) -> Option<Message> {
        let dispatcher = self.current();
        dispatcher.exchange(query, inbound_ip).await
    }
}
