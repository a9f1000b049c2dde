//! # Adapters
//!
//! - `memory` - in-memory [`ProposalStore`](crate::ports::ProposalStore)
//! - `rocksdb_store` - persistent store (feature `rocksdb`)
//! - `oracle` - allow-list and allow-all identity oracles
//! - `time` - system clock

pub mod memory;
pub mod oracle;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;
pub mod time;

pub use memory::InMemoryProposalStore;
pub use oracle::{AllowAllOracle, StaticIdentityOracle};
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbProposalStore};
pub use time::SystemTimeSource;
