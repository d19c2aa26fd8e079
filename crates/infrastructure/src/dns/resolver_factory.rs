use super::bootstrap::RandomBootstrapResolver;
use super::resolver::DnsUpstreamResolver;
use splitroute_application::ports::{BootstrapResolver, ResolverFactory, UpstreamResolver};
use splitroute_domain::{DomainError, UpstreamDescriptor};
use std::sync::Arc;
use tracing::debug;

/// Builds network-backed resolvers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkResolverFactory;

impl ResolverFactory for NetworkResolverFactory {
    fn bootstrap(&self, addresses: &[String]) -> Option<Arc<dyn BootstrapResolver>> {
        RandomBootstrapResolver::new(addresses.to_vec())
            .map(|resolver| Arc::new(resolver) as Arc<dyn BootstrapResolver>)
    }

    fn create(
        &self,
        descriptor: &UpstreamDescriptor,
        bootstrap: Option<Arc<dyn BootstrapResolver>>,
    ) -> Result<Arc<dyn UpstreamResolver>, DomainError> {
        let resolver = DnsUpstreamResolver::new(descriptor, bootstrap)?;
        debug!(
            upstream = %descriptor.name,
            endpoint = %resolver.endpoint(),
            "Upstream resolver created"
        );
        Ok(Arc::new(resolver))
    }
}
