//! Gateway service: router construction, background maintenance and the
//! HTTP server lifecycle.

use crate::domain::config::{GatewayConfig, ThrottleConfig};
use crate::domain::error::GatewayError;
use crate::handlers;
use crate::middleware::IpGuardLayer;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use pd_01_signature_auth::{RequestAuthenticator, SignatureAuthService};
use pd_02_proposal_registry::{ProposalRegistryApi, TimeSource};
use pd_03_availability_pipeline::AvailabilityRecorder;
use shared_types::{ActionThrottle, FeatureFlags};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Collaborators the gateway drives.
#[derive(Clone)]
pub struct GatewayComponents {
    pub registry: Arc<dyn ProposalRegistryApi>,
    pub availability: Arc<dyn AvailabilityRecorder>,
    pub clock: Arc<dyn TimeSource>,
    pub flags: Arc<FeatureFlags>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<dyn RequestAuthenticator>,
    pub registry: Arc<dyn ProposalRegistryApi>,
    pub availability: Arc<dyn AvailabilityRecorder>,
    pub clock: Arc<dyn TimeSource>,
    pub flags: Arc<FeatureFlags>,
    pub throttle: Arc<ActionThrottle>,
    pub throttle_config: Arc<ThrottleConfig>,
}

/// HTTP gateway for proposal discovery.
pub struct DiscoveryGateway {
    config: GatewayConfig,
    state: AppState,
}

impl DiscoveryGateway {
    pub fn new(config: GatewayConfig, components: GatewayComponents) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let state = AppState {
            authenticator: Arc::new(SignatureAuthService::new()),
            registry: components.registry,
            availability: components.availability,
            clock: components.clock,
            flags: components.flags,
            throttle: Arc::new(ActionThrottle::new()),
            throttle_config: Arc::new(config.throttle.clone()),
        };

        Ok(Self { config, state })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shared throttle cache; `clear()` it to isolate test scenarios.
    pub fn throttle(&self) -> Arc<ActionThrottle> {
        Arc::clone(&self.state.throttle)
    }

    pub fn flags(&self) -> Arc<FeatureFlags> {
        Arc::clone(&self.state.flags)
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(IpGuardLayer::new(&self.config.security));

        Router::new()
            .route("/health", get(handlers::health_check))
            .route("/v1/identities", post(handlers::create_identity))
            .route("/v1/register_proposal", post(handlers::register_proposal))
            .route("/v1/unregister_proposal", post(handlers::unregister_proposal))
            .route("/v1/ping_proposal", post(handlers::ping_proposal))
            .route("/v1/node_send_stats", post(handlers::node_send_stats))
            .route("/v1/proposals", get(handlers::list_proposals))
            .layer(DefaultBodyLimit::max(self.config.http.max_body_bytes))
            .layer(middleware)
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "Starting HTTP server");

        let cleanup = self.start_cleanup_tasks();
        let result = axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await;
        cleanup.abort();

        info!("HTTP server stopped");
        result.map_err(|e| GatewayError::Server(e.to_string()))
    }

    /// Start background cleanup tasks
    fn start_cleanup_tasks(&self) -> JoinHandle<()> {
        let throttle = Arc::clone(&self.state.throttle);
        let interval = self.config.throttle.purge_interval;
        let max_age = self.config.throttle.max_window();
        tokio::spawn(throttle_purge_task(throttle, interval, max_age))
    }
}

/// Drop throttle entries that can no longer reject anything.
pub async fn throttle_purge_task(throttle: Arc<ActionThrottle>, interval: Duration, max_age: Duration) {
    let mut purge_interval = tokio::time::interval(interval);
    purge_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        purge_interval.tick().await;
        let removed = throttle.purge_expired(max_age);
        if removed > 0 {
            debug!(removed, "Purged expired throttle entries");
        }
    }
}
