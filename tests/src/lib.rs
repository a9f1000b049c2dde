//! # Proposal Discovery Test Suite
//!
//! End-to-end scenarios that drive the gateway router in-process, with
//! real signatures, the in-memory store, a manual clock and a live
//! availability pipeline.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs        # TestApp: wiring + request helpers
//!     ├── auth_flows.rs     # Authorization header handling
//!     ├── identity_flows.rs # POST /v1/identities
//!     ├── register_flows.rs # register / unregister
//!     ├── listing_flows.rs  # GET /v1/proposals filters and liveness
//!     └── ping_flows.rs     # pings, session stats, throttling
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p discovery-tests
//! cargo test -p discovery-tests integration::ping_flows
//! ```

pub mod integration;
