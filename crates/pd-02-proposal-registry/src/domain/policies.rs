//! # Access Policy Reconciliation
//!
//! A re-registration replaces the provider's policy set. The change is
//! applied as a diff: stale entries removed, new entries added, unchanged
//! entries left in place.

use shared_types::AccessPolicy;
use std::collections::BTreeSet;

/// Add/remove sets that turn the current policy set into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDiff {
    pub to_add: Vec<AccessPolicy>,
    pub to_remove: Vec<AccessPolicy>,
}

impl PolicyDiff {
    pub fn between(current: &BTreeSet<AccessPolicy>, desired: &BTreeSet<AccessPolicy>) -> Self {
        Self {
            to_add: desired.difference(current).cloned().collect(),
            to_remove: current.difference(desired).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}
