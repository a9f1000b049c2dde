//! # Ports
//!
//! - **Inbound**: [`RequestAuthenticator`](inbound::RequestAuthenticator)

pub mod inbound;
