//! Configuration loading.
//!
//! Order of precedence, lowest first: built-in defaults, the TOML file named
//! by `DISCOVERY_CONFIG`, then individual `DISCOVERY_*` variables.

use pd_04_api_gateway::{GatewayConfig, StorageBackend};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Names the TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "DISCOVERY_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },

    #[error(transparent)]
    Invalid(#[from] pd_04_api_gateway::domain::ConfigError),
}

/// Load configuration from file and process environment, then validate.
pub fn load_config() -> Result<GatewayConfig, ConfigError> {
    let file = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    load_config_from(file.as_deref(), |name| std::env::var(name).ok())
}

/// [`load_config`] with the file path and variable lookup injected.
pub fn load_config_from<F>(file: Option<&Path>, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let config: GatewayConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

/// Overlay `DISCOVERY_*` variables onto `config`.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("DISCOVERY_HTTP_HOST") {
        config.http.host = parse("DISCOVERY_HTTP_HOST", &v)?;
    }
    if let Some(v) = get("DISCOVERY_HTTP_PORT") {
        config.http.port = parse("DISCOVERY_HTTP_PORT", &v)?;
    }

    if let Some(v) = get("DISCOVERY_VERIFY_IDENTITY") {
        config.verification.verify_identity = parse_bool("DISCOVERY_VERIFY_IDENTITY", &v)?;
    }
    if let Some(v) = get("DISCOVERY_REGISTERED_IDENTITIES") {
        config.verification.registered_identities = split_list(&v).map(str::to_string).collect();
    }

    if let Some(v) = get("DISCOVERY_THROTTLE_PING") {
        config.throttle.ping = parse_bool("DISCOVERY_THROTTLE_PING", &v)?;
    }
    if let Some(v) = get("DISCOVERY_THROTTLE_REGISTER") {
        config.throttle.register = parse_bool("DISCOVERY_THROTTLE_REGISTER", &v)?;
    }
    if let Some(v) = get("DISCOVERY_THROTTLE_SESSION_STATS") {
        config.throttle.session_stats = parse_bool("DISCOVERY_THROTTLE_SESSION_STATS", &v)?;
    }

    if let Some(v) = get("DISCOVERY_AVAILABILITY_TIMEOUT") {
        config.availability.timeout = parse_duration("DISCOVERY_AVAILABILITY_TIMEOUT", &v)?;
    }
    if let Some(v) = get("DISCOVERY_AVAILABILITY_BATCH_SIZE") {
        config.availability.batch_size = parse("DISCOVERY_AVAILABILITY_BATCH_SIZE", &v)?;
    }

    if let Some(v) = get("DISCOVERY_RESTRICT_BY_IP") {
        config.security.restrict_by_ip = parse_bool("DISCOVERY_RESTRICT_BY_IP", &v)?;
    }
    if let Some(v) = get("DISCOVERY_ALLOWED_IPS") {
        config.security.allowed_ips = split_list(&v)
            .map(|ip| parse::<IpAddr>("DISCOVERY_ALLOWED_IPS", ip))
            .collect::<Result<_, _>>()?;
    }

    if let Some(v) = get("DISCOVERY_STORAGE_BACKEND") {
        config.storage.backend = match v.trim().to_ascii_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "rocksdb" => StorageBackend::RocksDb,
            _ => return Err(invalid("DISCOVERY_STORAGE_BACKEND", &v)),
        };
    }
    if let Some(v) = get("DISCOVERY_STORAGE_PATH") {
        config.storage.path = Some(PathBuf::from(v));
    }

    if let Some(v) = get("DISCOVERY_LOG_LEVEL") {
        config.logging.level = v;
    }
    if let Some(v) = get("DISCOVERY_LOG_JSON") {
        config.logging.json = parse_bool("DISCOVERY_LOG_JSON", &v)?;
    }
    if let Some(v) = get("DISCOVERY_DISABLE_LOGS") {
        config.logging.disable = parse_bool("DISCOVERY_DISABLE_LOGS", &v)?;
    }

    Ok(())
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(var, value))
}

/// Accepts y/yes/t/true/on/1 and n/no/f/false/off/0, any case.
fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(invalid(var, value)),
    }
}

fn parse_duration(var: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime_serde::re::humantime::parse_duration(value.trim()).map_err(|_| invalid(var, value))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
