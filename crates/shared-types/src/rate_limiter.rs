//! # Action Throttle
//!
//! Last-accepted-timestamp cache guarding hot endpoints.
//!
//! ## Algorithm
//!
//! One entry per (identity, action class, service type):
//! - No entry, or the entry is at least `window` old: record now, allow
//! - Otherwise: reject without touching the stored timestamp
//!
//! Entries are independent, so one identity's openvpn budget never affects
//! its wireguard budget, and never affects another identity.

use crate::errors::ThrottleError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Throttled action classes. Each has its own enable flag and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Ping,
    Register,
    SessionStats,
}

impl ActionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionClass::Ping => "ping",
            ActionClass::Register => "register",
            ActionClass::SessionStats => "session_stats",
        }
    }
}

impl fmt::Display for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key for one throttled budget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThrottleKey {
    pub identity: String,
    pub action: ActionClass,
    pub service_type: String,
}

impl ThrottleKey {
    pub fn new(
        identity: impl Into<String>,
        action: ActionClass,
        service_type: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            action,
            service_type: service_type.into(),
        }
    }
}

/// Shared throttle state. Constructed at service start, cleared for test
/// isolation, dropped at shutdown.
#[derive(Debug, Default)]
pub struct ActionThrottle {
    entries: DashMap<ThrottleKey, Instant>,
}

impl ActionThrottle {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check the key against `window` and record the attempt if allowed.
    pub fn check_and_record(&self, key: ThrottleKey, window: Duration) -> Result<(), ThrottleError> {
        self.check_and_record_at(key, window, Instant::now())
    }

    /// Same as [`check_and_record`](Self::check_and_record) with an explicit clock.
    pub fn check_and_record_at(
        &self,
        key: ThrottleKey,
        window: Duration,
        now: Instant,
    ) -> Result<(), ThrottleError> {
        match self.entries.entry(key) {
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                Ok(())
            }
            Entry::Occupied(mut occupied) => {
                let elapsed = now.saturating_duration_since(*occupied.get());
                if elapsed >= window {
                    occupied.insert(now);
                    Ok(())
                } else {
                    let retry_after = window - elapsed;
                    debug!(
                        identity = %occupied.key().identity,
                        action = %occupied.key().action,
                        retry_after_ms = retry_after.as_millis() as u64,
                        "Throttled action"
                    );
                    Err(ThrottleError::TooManyRequests { retry_after })
                }
            }
        }
    }

    /// Drop entries older than `max_age`. Returns how many were removed.
    pub fn purge_expired(&self, max_age: Duration) -> usize {
        self.purge_expired_at(max_age, Instant::now())
    }

    pub fn purge_expired_at(&self, max_age: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, last| now.saturating_duration_since(*last) < max_age);
        before.saturating_sub(self.entries.len())
    }

    /// Forget every recorded attempt.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
