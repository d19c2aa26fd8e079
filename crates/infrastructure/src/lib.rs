//! Network and file adapters behind the splitroute application ports.
pub mod config;
pub mod dns;
