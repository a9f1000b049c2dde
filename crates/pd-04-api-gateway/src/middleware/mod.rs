//! HTTP middleware.

pub mod ip_guard;

pub use ip_guard::{extract_client_ip, ClientIp, IpGuardLayer};
