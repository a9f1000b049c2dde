use crate::ports::outbound::TimeSource;
use chrono::Utc;
use shared_types::Timestamp;

/// Production time source using the system clock.
///
/// For testing, use `FixedTimeSource` or `ManualTimeSource` from the test
/// utilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}
