use splitroute_application::ports::ResponseCache;
use splitroute_application::use_cases::{Dispatcher, DispatcherHandle};
use splitroute_domain::Config;
use splitroute_infrastructure::config::build_dispatcher_config;
use splitroute_infrastructure::dns::{MessageCache, NetworkResolverFactory};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub dispatcher: Arc<DispatcherHandle>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let dispatcher = build_dispatcher(config)?;
        info!(
            primary = config.dispatch.primary_dns.len(),
            alternative = config.dispatch.alternative_dns.len(),
            cache_size = config.cache.size,
            "DNS services ready"
        );
        Ok(Self {
            dispatcher: Arc::new(DispatcherHandle::new(dispatcher)),
        })
    }
}

/// Every build starts with an empty cache, so a reload never serves answers
/// routed under the previous lists.
pub fn build_dispatcher(config: &Config) -> anyhow::Result<Dispatcher> {
    let cache: Arc<dyn ResponseCache> = Arc::new(MessageCache::new(config.cache.size));
    let dispatcher_config = build_dispatcher_config(config, cache)?;
    Ok(Dispatcher::init(dispatcher_config, &NetworkResolverFactory)?)
}
