//! Dispatch core: ports, per-query client bundles and the router that
//! picks between the primary and alternative upstream groups.
pub mod ports;
pub mod services;
pub mod use_cases;
