//! # Identity Oracle Adapters
//!
//! The real oracle is an on-chain identity contract living outside this
//! workspace. These adapters cover configuration-driven deployments and
//! tests.

use crate::domain::errors::OracleError;
use crate::ports::outbound::IdentityOracle;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::HashSet;

/// Answers from a fixed allow-list, extendable at runtime.
#[derive(Debug, Default)]
pub struct StaticIdentityOracle {
    registered: RwLock<HashSet<Address>>,
}

impl StaticIdentityOracle {
    pub fn new(registered: impl IntoIterator<Item = Address>) -> Self {
        Self {
            registered: RwLock::new(registered.into_iter().collect()),
        }
    }

    pub fn register(&self, address: Address) {
        self.registered.write().insert(address);
    }

    pub fn revoke(&self, address: &Address) {
        self.registered.write().remove(address);
    }
}

#[async_trait]
impl IdentityOracle for StaticIdentityOracle {
    async fn is_registered(&self, address: &Address) -> Result<bool, OracleError> {
        Ok(self.registered.read().contains(address))
    }
}

/// Treats every address as registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllOracle;

#[async_trait]
impl IdentityOracle for AllowAllOracle {
    async fn is_registered(&self, _address: &Address) -> Result<bool, OracleError> {
        Ok(true)
    }
}
