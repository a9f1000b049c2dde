//! # Runtime Feature Flags
//!
//! Switches read on every request, so operators and tests can flip them
//! without rebuilding or restarting the service.

use crate::rate_limiter::ActionClass;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared runtime toggles.
#[derive(Debug)]
pub struct FeatureFlags {
    verify_identity: AtomicBool,
    throttle_ping: AtomicBool,
    throttle_register: AtomicBool,
    throttle_session_stats: AtomicBool,
}

impl FeatureFlags {
    pub fn new(verify_identity: bool) -> Self {
        Self {
            verify_identity: AtomicBool::new(verify_identity),
            throttle_ping: AtomicBool::new(false),
            throttle_register: AtomicBool::new(false),
            throttle_session_stats: AtomicBool::new(false),
        }
    }

    /// Whether registration must be confirmed by the identity oracle.
    pub fn verify_identity(&self) -> bool {
        self.verify_identity.load(Ordering::Relaxed)
    }

    pub fn set_verify_identity(&self, enabled: bool) {
        self.verify_identity.store(enabled, Ordering::Relaxed);
    }

    /// Whether the throttle is consulted for this action class.
    pub fn throttle_enabled(&self, action: ActionClass) -> bool {
        self.throttle_flag(action).load(Ordering::Relaxed)
    }

    pub fn set_throttle(&self, action: ActionClass, enabled: bool) {
        self.throttle_flag(action).store(enabled, Ordering::Relaxed);
    }

    fn throttle_flag(&self, action: ActionClass) -> &AtomicBool {
        match action {
            ActionClass::Ping => &self.throttle_ping,
            ActionClass::Register => &self.throttle_register,
            ActionClass::SessionStats => &self.throttle_session_stats,
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::new(true)
    }
}
