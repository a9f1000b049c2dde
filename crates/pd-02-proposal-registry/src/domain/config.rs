use std::time::Duration;

/// Default liveness window.
pub const DEFAULT_AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Registry tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// A node is active iff its last registration or ping is at most this old.
    pub availability_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            availability_timeout: DEFAULT_AVAILABILITY_TIMEOUT,
        }
    }
}
