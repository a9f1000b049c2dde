//! Test utilities for the proposal registry.
//!
//! Controllable clocks for deterministic liveness tests. Enable with the
//! `test-utils` feature flag.

use crate::ports::outbound::TimeSource;
use chrono::TimeZone;
use chrono::Utc;
use parking_lot::Mutex;
use shared_types::Timestamp;
use std::time::Duration;

/// A time source that always returns the same instant.
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    timestamp: Timestamp,
}

impl FixedTimeSource {
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Fixed at `secs` seconds after the Unix epoch.
    pub fn at_secs(secs: i64) -> Self {
        Self::new(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// A time source that only moves when told to.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: Mutex<Timestamp>,
}

impl ManualTimeSource {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock() = to;
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
