//! # Discovery Runtime
//!
//! Process-level concerns of the discovery backend: configuration loading,
//! logging initialization and component wiring. The binary in `main.rs` is a
//! thin shell around these.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, `DISCOVERY_CONFIG` file, `DISCOVERY_*` env)
//! 2. Initialize tracing
//! 3. Open the store and build the registry
//! 4. Start the availability pipeline workers
//! 5. Serve HTTP until Ctrl+C
//! 6. Drain the pipeline and exit

pub mod config;
pub mod container;
pub mod logging;

pub use config::{load_config, ConfigError};
pub use container::{DiscoveryRuntime, RuntimeError};
pub use logging::init_tracing;
