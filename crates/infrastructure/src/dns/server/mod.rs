//! Inbound DNS listeners. Every query goes through the current dispatcher
//! snapshot; an absent answer becomes SERVFAIL.

mod handler;
mod tcp;
mod udp;

pub use handler::DnsServerHandler;
pub use tcp::serve_tcp;
pub use udp::serve_udp;
