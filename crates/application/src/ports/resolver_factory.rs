use super::{BootstrapResolver, UpstreamResolver};
use splitroute_domain::{DomainError, UpstreamDescriptor};
use std::sync::Arc;

/// Builds resolvers for the dispatcher so tests can swap the network out.
pub trait ResolverFactory: Send + Sync {
    /// `None` when `addresses` is empty.
    fn bootstrap(&self, addresses: &[String]) -> Option<Arc<dyn BootstrapResolver>>;

    fn create(
        &self,
        descriptor: &UpstreamDescriptor,
        bootstrap: Option<Arc<dyn BootstrapResolver>>,
    ) -> Result<Arc<dyn UpstreamResolver>, DomainError>;
}
