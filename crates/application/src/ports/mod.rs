mod bootstrap_resolver;
mod domain_matcher;
mod resolver_factory;
mod response_cache;
mod upstream_resolver;

pub use bootstrap_resolver::BootstrapResolver;
pub use domain_matcher::DomainMatcher;
pub use resolver_factory::ResolverFactory;
pub use response_cache::ResponseCache;
pub use upstream_resolver::UpstreamResolver;
