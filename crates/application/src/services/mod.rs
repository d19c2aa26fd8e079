pub mod client_bundle;
pub mod local_client;
pub mod message;
pub mod ttl_policy;

pub use client_bundle::{ClientBundle, Group};
pub use local_client::LocalClient;
pub use ttl_policy::TtlPolicy;
