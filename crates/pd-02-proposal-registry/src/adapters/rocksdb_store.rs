//! # RocksDB Proposal Store
//!
//! Persistent [`ProposalStore`] on RocksDB.
//!
//! ## Column Families
//!
//! - `identities` - `address` -> `Identity`
//! - `nodes` - `provider \0 service_type` -> `Node`
//! - `access_policies` - `provider \0 id \0 source` -> `AccessPolicy`
//! - `identity_registrations` - `provider` -> `IdentityRegistration`
//! - `node_availability` - `provider \0 service_type \0 micros seq` -> `NodeAvailability`
//!
//! Values are JSON. Key order matches the in-memory store's ordering, so
//! listings are stable across backends.

use crate::domain::errors::StoreError;
use crate::domain::policies::PolicyDiff;
use crate::ports::outbound::ProposalStore;
use parking_lot::RwLock;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    AccessPolicy, Address, Identity, IdentityRegistration, Node, NodeAvailability, NodeKey,
    ProviderId, Timestamp,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

pub const CF_IDENTITIES: &str = "identities";
pub const CF_NODES: &str = "nodes";
pub const CF_ACCESS_POLICIES: &str = "access_policies";
pub const CF_IDENTITY_REGISTRATIONS: &str = "identity_registrations";
pub const CF_NODE_AVAILABILITY: &str = "node_availability";

/// All column families used by the store.
pub const COLUMN_FAMILIES: &[&str] = &[
    CF_IDENTITIES,
    CF_NODES,
    CF_ACCESS_POLICIES,
    CF_IDENTITY_REGISTRATIONS,
    CF_NODE_AVAILABILITY,
];

const SEPARATOR: u8 = 0;

/// RocksDB tuning.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 32MB)
    pub write_buffer_size: usize,
    /// fsync after each write (default: true)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/discovery".to_string(),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 32 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Small buffers, no sync.
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed [`ProposalStore`].
pub struct RocksDbProposalStore {
    db: RwLock<DB>,
    config: RocksDbConfig,
    availability_seq: AtomicU64,
}

impl RocksDbProposalStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StoreError::Backend(format!("Failed to open RocksDB: {e}")))?;

        Ok(Self {
            db: RwLock::new(db),
            config,
            availability_seq: AtomicU64::new(0),
        })
    }

    fn write_opts(&self) -> rocksdb::WriteOptions {
        let mut opts = rocksdb::WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>, StoreError> {
        read_json(&self.db.read(), cf_name, key)
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<(), StoreError> {
        let db = self.db.write();
        let cf = cf(&db, cf_name)?;
        db.put_cf_opt(cf, key, encode(value)?, &self.write_opts())
            .map_err(|e| StoreError::Backend(format!("RocksDB put failed: {e}")))
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<T>, StoreError> {
        scan_prefix(&self.db.read(), cf_name, prefix)
    }
}

impl ProposalStore for RocksDbProposalStore {
    fn insert_identity(&self, identity: Identity) -> Result<bool, StoreError> {
        let key = identity.address.as_bytes().to_vec();
        // Held across check and put so two creations cannot both succeed.
        let db = self.db.write();
        let cf = cf(&db, CF_IDENTITIES)?;

        let exists = db
            .get_pinned_cf(cf, &key)
            .map_err(|e| StoreError::Backend(format!("RocksDB exists check failed: {e}")))?
            .is_some();
        if exists {
            return Ok(false);
        }

        db.put_cf_opt(cf, &key, encode(&identity)?, &self.write_opts())
            .map_err(|e| StoreError::Backend(format!("RocksDB put failed: {e}")))?;
        Ok(true)
    }

    fn identity_exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self
            .get_json::<Identity>(CF_IDENTITIES, address.as_bytes())?
            .is_some())
    }

    fn get_node(&self, key: &NodeKey) -> Result<Option<Node>, StoreError> {
        self.get_json(CF_NODES, &node_key_bytes(key))
    }

    fn apply_registration(
        &self,
        node: Node,
        policies: &BTreeSet<AccessPolicy>,
    ) -> Result<PolicyDiff, StoreError> {
        let raw_key = node_key_bytes(&node.key);
        // Held from the reads through the batch write.
        let db = self.db.write();
        let nodes_cf = cf(&db, CF_NODES)?;
        let policies_cf = cf(&db, CF_ACCESS_POLICIES)?;

        let node = match read_json::<Node>(&db, CF_NODES, &raw_key)? {
            Some(existing) => Node {
                created_at: existing.created_at,
                ..node
            },
            None => node,
        };
        let current: BTreeSet<AccessPolicy> = scan_prefix::<AccessPolicy>(
            &db,
            CF_ACCESS_POLICIES,
            &prefix_bytes(&[node.key.provider.as_str()]),
        )?
        .into_iter()
        .collect();
        let diff = PolicyDiff::between(&current, policies);

        let mut batch = WriteBatch::default();
        batch.put_cf(nodes_cf, &raw_key, encode(&node)?);
        for policy in &diff.to_remove {
            batch.delete_cf(policies_cf, policy_key_bytes(policy));
        }
        for policy in &diff.to_add {
            batch.put_cf(policies_cf, policy_key_bytes(policy), encode(policy)?);
        }

        db.write_opt(batch, &self.write_opts())
            .map_err(|e| StoreError::Backend(format!("RocksDB batch write failed: {e}")))?;
        Ok(diff)
    }

    fn set_node_activity(
        &self,
        key: &NodeKey,
        updated_at: Option<Timestamp>,
    ) -> Result<bool, StoreError> {
        let raw_key = node_key_bytes(key);
        let db = self.db.write();
        let cf = cf(&db, CF_NODES)?;

        let Some(bytes) = db
            .get_cf(cf, &raw_key)
            .map_err(|e| StoreError::Backend(format!("RocksDB get failed: {e}")))?
        else {
            return Ok(false);
        };

        let mut node: Node = decode(&bytes)?;
        node.updated_at = updated_at;
        db.put_cf_opt(cf, &raw_key, encode(&node)?, &self.write_opts())
            .map_err(|e| StoreError::Backend(format!("RocksDB put failed: {e}")))?;
        Ok(true)
    }

    fn nodes_for_provider(&self, provider: &ProviderId) -> Result<Vec<Node>, StoreError> {
        self.scan_json(CF_NODES, &prefix_bytes(&[provider.as_str()]))
    }

    fn list_nodes(&self) -> Result<Vec<Node>, StoreError> {
        self.scan_json(CF_NODES, &[])
    }

    fn access_policies(&self, provider: &ProviderId) -> Result<BTreeSet<AccessPolicy>, StoreError> {
        Ok(self
            .scan_json::<AccessPolicy>(CF_ACCESS_POLICIES, &prefix_bytes(&[provider.as_str()]))?
            .into_iter()
            .collect())
    }

    fn has_identity_registration(&self, provider: &ProviderId) -> Result<bool, StoreError> {
        Ok(self
            .get_json::<IdentityRegistration>(CF_IDENTITY_REGISTRATIONS, provider.as_str().as_bytes())?
            .is_some())
    }

    fn insert_identity_registration(&self, registration: IdentityRegistration) -> Result<(), StoreError> {
        self.put_json(
            CF_IDENTITY_REGISTRATIONS,
            registration.provider.as_str().as_bytes(),
            &registration,
        )
    }

    fn insert_availability_batch(&self, batch: &[NodeAvailability]) -> Result<(), StoreError> {
        let db = self.db.write();
        let cf = cf(&db, CF_NODE_AVAILABILITY)?;
        let mut write = WriteBatch::default();

        for ping in batch {
            let seq = self.availability_seq.fetch_add(1, Ordering::Relaxed);
            write.put_cf(cf, availability_key_bytes(ping, seq), encode(ping)?);
        }

        db.write_opt(write, &self.write_opts())
            .map_err(|e| StoreError::Backend(format!("RocksDB batch write failed: {e}")))
    }

    fn availability_for(&self, key: &NodeKey) -> Result<Vec<NodeAvailability>, StoreError> {
        self.scan_json(
            CF_NODE_AVAILABILITY,
            &prefix_bytes(&[key.provider.as_str(), key.service_type.as_str()]),
        )
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily, StoreError> {
    db.cf_handle(name)
        .ok_or_else(|| StoreError::Backend(format!("missing column family {name}")))
}

fn read_json<T: DeserializeOwned>(db: &DB, cf_name: &str, key: &[u8]) -> Result<Option<T>, StoreError> {
    db.get_cf(cf(db, cf_name)?, key)
        .map_err(|e| StoreError::Backend(format!("RocksDB get failed: {e}")))?
        .map(|bytes| decode(&bytes))
        .transpose()
}

fn scan_prefix<T: DeserializeOwned>(db: &DB, cf_name: &str, prefix: &[u8]) -> Result<Vec<T>, StoreError> {
    let mode = if prefix.is_empty() {
        IteratorMode::Start
    } else {
        IteratorMode::From(prefix, Direction::Forward)
    };

    let mut results = Vec::new();
    for item in db.iterator_cf(cf(db, cf_name)?, mode) {
        let (key, value) =
            item.map_err(|e| StoreError::Backend(format!("RocksDB scan failed: {e}")))?;
        if !key.starts_with(prefix) {
            break;
        }
        results.push(decode(&value)?);
    }
    Ok(results)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// `part \0 part \0 ... \0`; the trailing separator keeps `node1` from
/// matching `node10`.
fn prefix_bytes(parts: &[&str]) -> Vec<u8> {
    let mut key = Vec::new();
    for part in parts {
        key.extend_from_slice(part.as_bytes());
        key.push(SEPARATOR);
    }
    key
}

fn node_key_bytes(key: &NodeKey) -> Vec<u8> {
    let mut bytes = prefix_bytes(&[key.provider.as_str()]);
    bytes.extend_from_slice(key.service_type.as_bytes());
    bytes
}

fn policy_key_bytes(policy: &AccessPolicy) -> Vec<u8> {
    let mut bytes = prefix_bytes(&[policy.provider.as_str(), policy.id.as_str()]);
    bytes.extend_from_slice(policy.source.as_bytes());
    bytes
}

fn availability_key_bytes(ping: &NodeAvailability, seq: u64) -> Vec<u8> {
    let mut bytes = prefix_bytes(&[ping.provider.as_str(), ping.service_type.as_str()]);
    // Sign bit flipped so pre-epoch timestamps still sort first.
    let micros = (ping.recorded_at.timestamp_micros() as u64) ^ (1 << 63);
    bytes.extend_from_slice(&micros.to_be_bytes());
    bytes.extend_from_slice(&seq.to_be_bytes());
    bytes
}
