//! Component wiring.
//!
//! Builds the store, identity oracle, registry, availability pipeline and
//! gateway from one [`GatewayConfig`], and tears them down in reverse: the
//! HTTP server stops accepting first, then the pipeline drains its queue.

use pd_02_proposal_registry::{
    IdentityOracle, InMemoryProposalStore, ProposalRegistryService, ProposalStore,
    StaticIdentityOracle, SystemTimeSource, TimeSource,
};
use pd_03_availability_pipeline::AvailabilityPipeline;
use pd_04_api_gateway::domain::{StorageConfig, VerificationConfig};
use pd_04_api_gateway::{
    DiscoveryGateway, GatewayComponents, GatewayConfig, GatewayError, StorageBackend,
    StoreAvailabilitySink,
};
use shared_types::Address;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Startup and serving failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid registered identity {value:?}: {reason}")]
    InvalidIdentity { value: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A fully wired discovery backend.
pub struct DiscoveryRuntime {
    registry: Arc<ProposalRegistryService>,
    pipeline: AvailabilityPipeline,
    gateway: DiscoveryGateway,
}

impl DiscoveryRuntime {
    /// Wire every component. Spawns the pipeline workers, so it must be
    /// called inside a tokio runtime.
    pub fn build(config: GatewayConfig) -> Result<Self, RuntimeError> {
        let store = open_store(&config.storage)?;
        let oracle = build_oracle(&config.verification)?;
        let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource::new());
        let flags = Arc::new(config.feature_flags());

        let registry = Arc::new(ProposalRegistryService::new(
            Arc::clone(&store),
            oracle,
            Arc::clone(&clock),
            Arc::clone(&flags),
            config.registry(),
        ));

        let pipeline = AvailabilityPipeline::start(
            config.availability.pipeline(),
            Arc::new(StoreAvailabilitySink::new(store)),
        )
        .map_err(|e| GatewayError::Pipeline(e.to_string()))?;

        let gateway = DiscoveryGateway::new(
            config,
            GatewayComponents {
                registry: registry.clone(),
                availability: Arc::new(pipeline.handle()),
                clock,
                flags,
            },
        )?;

        Ok(Self {
            registry,
            pipeline,
            gateway,
        })
    }

    pub fn gateway(&self) -> &DiscoveryGateway {
        &self.gateway
    }

    pub fn registry(&self) -> Arc<ProposalRegistryService> {
        Arc::clone(&self.registry)
    }

    /// Serve until `shutdown` resolves, then drain the pipeline.
    pub async fn run<F>(self, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = self.gateway.start(shutdown).await;
        self.pipeline.shutdown().await;
        served?;
        info!("Discovery runtime stopped");
        Ok(())
    }
}

fn open_store(config: &StorageConfig) -> Result<Arc<dyn ProposalStore>, RuntimeError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory proposal store");
            Ok(Arc::new(InMemoryProposalStore::new()))
        }
        StorageBackend::RocksDb => open_rocksdb(config),
    }
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(config: &StorageConfig) -> Result<Arc<dyn ProposalStore>, RuntimeError> {
    use pd_02_proposal_registry::{RocksDbConfig, RocksDbProposalStore};

    let path = config
        .path
        .as_ref()
        .ok_or_else(|| RuntimeError::Storage("rocksdb storage requires a path".into()))?;
    let store = RocksDbProposalStore::open(RocksDbConfig {
        path: path.to_string_lossy().into_owned(),
        ..RocksDbConfig::default()
    })
    .map_err(|e| RuntimeError::Storage(e.to_string()))?;
    info!(path = %path.display(), "Opened RocksDB proposal store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(_config: &StorageConfig) -> Result<Arc<dyn ProposalStore>, RuntimeError> {
    Err(RuntimeError::Storage(
        "rocksdb backend requested but this build lacks the `rocksdb` feature".into(),
    ))
}

fn build_oracle(config: &VerificationConfig) -> Result<Arc<dyn IdentityOracle>, RuntimeError> {
    let registered = config
        .registered_identities
        .iter()
        .map(|raw| {
            Address::parse(raw).map_err(|e| RuntimeError::InvalidIdentity {
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if config.verify_identity && registered.is_empty() {
        warn!("Identity verification is on but no identities are registered; all registrations will be refused");
    }
    Ok(Arc::new(StaticIdentityOracle::new(registered)))
}
