pub mod config;
pub mod error;

pub use config::{
    AvailabilityConfig, ConfigError, GatewayConfig, HttpConfig, LoggingConfig, SecurityConfig,
    StorageBackend, StorageConfig, ThrottleConfig, VerificationConfig,
};
pub use error::{ApiError, ApiResult, GatewayError};
