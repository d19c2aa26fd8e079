//! Turns a loaded [`Config`](splitroute_domain::Config) into a
//! [`DispatcherConfig`], reading every list file it names.

mod list_file;
mod loader;

pub use list_file::{parse_domain_ttl, read_list_file};
pub use loader::{
    build_dispatcher_config, load_domain_matcher, load_domain_ttl, load_hosts,
    load_ip_network_set,
};

pub use splitroute_application::use_cases::DispatcherConfig;
