pub mod bootstrap;
pub mod cache;
pub mod forwarding;
pub mod matcher;
pub mod resolver;
pub mod resolver_factory;
pub mod server;
pub mod transport;

pub use bootstrap::{BootstrapServer, RandomBootstrapResolver};
pub use cache::MessageCache;
pub use matcher::build_matcher;
pub use resolver::DnsUpstreamResolver;
pub use resolver_factory::NetworkResolverFactory;
pub use server::DnsServerHandler;
