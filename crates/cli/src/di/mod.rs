mod dns;

pub use dns::{build_dispatcher, DnsServices};
