//! Gateway configuration with validation.

use pd_02_proposal_registry::{RegistryConfig, DEFAULT_AVAILABILITY_TIMEOUT};
use pd_03_availability_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use shared_types::{ActionClass, FeatureFlags};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub http: HttpConfig,
    pub verification: VerificationConfig,
    pub throttle: ThrottleConfig,
    pub availability: AvailabilityConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }

        for (action, window) in [
            (ActionClass::Ping, self.throttle.ping_window),
            (ActionClass::Register, self.throttle.register_window),
            (ActionClass::SessionStats, self.throttle.session_stats_window),
        ] {
            if window.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!(
                    "{action} throttle window cannot be 0"
                )));
            }
        }
        if self.throttle.purge_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "throttle purge_interval cannot be 0".into(),
            ));
        }

        if self.availability.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "availability timeout cannot be 0".into(),
            ));
        }
        self.availability
            .pipeline()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.security.restrict_by_ip && self.security.allowed_ips.is_empty() {
            return Err(ConfigError::Invalid(
                "restrict_by_ip requires at least one allowed ip".into(),
            ));
        }

        if self.storage.backend == StorageBackend::RocksDb && self.storage.path.is_none() {
            return Err(ConfigError::Invalid(
                "rocksdb storage requires a path".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    pub fn registry(&self) -> RegistryConfig {
        RegistryConfig {
            availability_timeout: self.availability.timeout,
        }
    }

    /// Runtime flags seeded from this configuration.
    pub fn feature_flags(&self) -> FeatureFlags {
        let flags = FeatureFlags::new(self.verification.verify_identity);
        flags.set_throttle(ActionClass::Ping, self.throttle.ping);
        flags.set_throttle(ActionClass::Register, self.throttle.register);
        flags.set_throttle(ActionClass::SessionStats, self.throttle.session_stats);
        flags
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Requests with larger bodies are rejected before reaching a handler.
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Identity verification against the identity oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Reject registrations from identities the oracle does not know.
    pub verify_identity: bool,
    /// Allow-list served by the bundled static oracle.
    pub registered_identities: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            verify_identity: true,
            registered_identities: Vec::new(),
        }
    }
}

/// Per-identity action throttling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub ping: bool,
    pub register: bool,
    pub session_stats: bool,
    #[serde(with = "humantime_serde")]
    pub ping_window: Duration,
    #[serde(with = "humantime_serde")]
    pub register_window: Duration,
    #[serde(with = "humantime_serde")]
    pub session_stats_window: Duration,
    /// How often expired throttle entries are dropped.
    #[serde(with = "humantime_serde")]
    pub purge_interval: Duration,
}

impl ThrottleConfig {
    pub fn window_for(&self, action: ActionClass) -> Duration {
        match action {
            ActionClass::Ping => self.ping_window,
            ActionClass::Register => self.register_window,
            ActionClass::SessionStats => self.session_stats_window,
        }
    }

    /// Entries older than the longest window can never reject again.
    pub fn max_window(&self) -> Duration {
        self.ping_window
            .max(self.register_window)
            .max(self.session_stats_window)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            ping: false,
            register: false,
            session_stats: false,
            ping_window: Duration::from_secs(60),
            register_window: Duration::from_secs(60),
            session_stats_window: Duration::from_secs(60),
            purge_interval: Duration::from_secs(60),
        }
    }
}

/// Liveness window and availability pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub batch_size: usize,
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    pub workers: usize,
    pub queue_capacity: usize,
}

impl AvailabilityConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            batch_size: self.batch_size,
            flush_interval: self.flush_interval,
            workers: self.workers,
            queue_capacity: self.queue_capacity,
        }
    }
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            timeout: DEFAULT_AVAILABILITY_TIMEOUT,
            batch_size: pipeline.batch_size,
            flush_interval: pipeline.flush_interval,
            workers: pipeline.workers,
            queue_capacity: pipeline.queue_capacity,
        }
    }
}

/// Source address handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Only `allowed_ips` may call mutating endpoints.
    pub restrict_by_ip: bool,
    pub allowed_ips: HashSet<IpAddr>,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Enable only behind a proxy that overwrites these headers.
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    RocksDb,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
    /// Silence all output.
    pub disable: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            disable: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
