//! Shared wiring for end-to-end scenarios.

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use pd_01_signature_auth::test_helpers::StaticSigner;
use pd_02_proposal_registry::test_utils::ManualTimeSource;
use pd_02_proposal_registry::{
    InMemoryProposalStore, ProposalRegistryService, ProposalStore, RegistryConfig,
    StaticIdentityOracle, TimeSource,
};
use pd_03_availability_pipeline::AvailabilityPipeline;
use pd_04_api_gateway::{DiscoveryGateway, GatewayComponents, GatewayConfig, StoreAvailabilitySink};
use serde_json::{json, Value};
use shared_types::{ActionClass, FeatureFlags};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Source address attached to every request, as the server would see it.
pub const REMOTE_ADDR: &str = "127.0.0.1";

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Response {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// A gateway over an in-memory backend with a hand-driven clock.
pub struct TestApp {
    pub router: Router,
    pub gateway: DiscoveryGateway,
    pub registry: Arc<ProposalRegistryService>,
    pub store: Arc<InMemoryProposalStore>,
    pub oracle: Arc<StaticIdentityOracle>,
    pub clock: Arc<ManualTimeSource>,
    pub flags: Arc<FeatureFlags>,
    pipeline: AvailabilityPipeline,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        let store = Arc::new(InMemoryProposalStore::new());
        let oracle = Arc::new(StaticIdentityOracle::default());
        let clock = Arc::new(ManualTimeSource::new(
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        ));
        let flags = Arc::new(config.feature_flags());

        let registry = Arc::new(ProposalRegistryService::new(
            store.clone(),
            oracle.clone(),
            clock.clone(),
            flags.clone(),
            RegistryConfig {
                availability_timeout: config.availability.timeout,
            },
        ));

        let mut pipeline_config = config.availability.pipeline();
        pipeline_config.flush_interval = Duration::from_millis(10);
        let pipeline = AvailabilityPipeline::start(
            pipeline_config,
            Arc::new(StoreAvailabilitySink::new(store.clone())),
        )
        .unwrap();

        let gateway_clock: Arc<dyn TimeSource> = clock.clone();
        let gateway = DiscoveryGateway::new(
            config,
            GatewayComponents {
                registry: registry.clone(),
                availability: Arc::new(pipeline.handle()),
                clock: gateway_clock,
                flags: flags.clone(),
            },
        )
        .unwrap();

        Self {
            router: gateway.router(),
            gateway,
            registry,
            store,
            oracle,
            clock,
            flags,
            pipeline,
        }
    }

    /// A fresh signer already known to the identity oracle.
    pub fn registered_signer(&self) -> StaticSigner {
        let signer = StaticSigner::random();
        self.oracle.register(signer.address());
        signer
    }

    pub fn enable_throttle(&self, action: ActionClass) {
        self.flags.set_throttle(action, true);
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        let mut request = request;
        let peer: SocketAddr = format!("{REMOTE_ADDR}:40000").parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Response {
            status,
            headers,
            body,
        }
    }

    /// POST `body` with an explicit `Authorization` value (or none).
    pub async fn post_raw(
        &self,
        path: &str,
        authorization: Option<&str>,
        body: impl Into<Vec<u8>>,
    ) -> Response {
        let mut builder = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::from(body.into())).unwrap()).await
    }

    /// POST `body` signed by `signer`.
    pub async fn post_signed(&self, path: &str, signer: &StaticSigner, body: &Value) -> Response {
        let bytes = serde_json::to_vec(body).unwrap();
        let authorization = signer.authorization_header(&bytes);
        self.post_raw(path, Some(&authorization), bytes).await
    }

    pub async fn get(&self, path_and_query: &str) -> Response {
        self.send(Request::get(path_and_query).body(Body::empty()).unwrap())
            .await
    }

    pub async fn register(&self, signer: &StaticSigner, service_type: &str) -> Response {
        let body = registration(signer, service_type, json!([]));
        self.post_signed("/v1/register_proposal", signer, &body).await
    }

    pub async fn register_with_policies(
        &self,
        signer: &StaticSigner,
        service_type: &str,
        policies: Value,
    ) -> Response {
        let body = registration(signer, service_type, policies);
        self.post_signed("/v1/register_proposal", signer, &body).await
    }

    /// Provider ids of the listing at `query`.
    pub async fn listed_providers(&self, query: &str) -> Vec<String> {
        let response = self.get(&format!("/v1/proposals{query}")).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["proposals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["provider_id"].as_str().unwrap().to_string())
            .collect()
    }

    /// Stop the pipeline, persisting every queued ping, and hand back the
    /// store for inspection.
    pub async fn drain(self) -> Arc<InMemoryProposalStore> {
        self.pipeline.shutdown().await;
        self.store
    }

    pub fn store(&self) -> &dyn ProposalStore {
        self.store.as_ref()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Register payload in the wire envelope.
pub fn registration(signer: &StaticSigner, service_type: &str, access_policies: Value) -> Value {
    registration_with_definition(signer, service_type, access_policies, json!({}))
}

pub fn registration_with_definition(
    signer: &StaticSigner,
    service_type: &str,
    access_policies: Value,
    service_definition: Value,
) -> Value {
    json!({
        "service_proposal": {
            "id": 1,
            "format": "service-proposal/v1",
            "provider_id": signer.address().to_canonical(),
            "service_type": service_type,
            "service_definition": service_definition,
            "access_policies": access_policies,
        }
    })
}
