pub mod cache;
pub mod dispatch;
pub mod errors;
pub mod local_records;
pub mod logging;
pub mod root;
pub mod server;
pub mod upstream;

pub use cache::CacheConfig;
pub use dispatch::{DispatchConfig, MatcherKind};
pub use errors::ConfigError;
pub use local_records::LocalDnsRecord;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::{EdnsClientSubnet, TcpPoolConfig, UpstreamDescriptor};
