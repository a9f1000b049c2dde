//! HTTP handlers.
//!
//! Mutating endpoints run in a fixed order: decode the body, authenticate
//! the signature over the raw bytes, validate against the registry, apply
//! the throttle, then mutate. Nothing is written unless every earlier step
//! passed.
//!
//! Registry calls that reach the store run on the blocking pool.

use crate::domain::error::{ApiError, ApiResult};
use crate::middleware::ClientIp;
use crate::service::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::{Extension, Json};
use pd_01_signature_auth::AuthError;
use pd_02_proposal_registry::{
    parse_object, AccessPolicyFilter, ProposalFilter, ProposalRegistryApi, RegistryError,
    ServiceTypeFilter,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::{ActionClass, Address, NodeAvailability, ProviderId, ThrottleKey};
use std::sync::Arc;
use tracing::{debug, warn};

fn acknowledged() -> Json<Value> {
    Json(json!({}))
}

/// Recover the caller from the `Authorization` header and the exact body.
fn authenticate(state: &AppState, headers: &HeaderMap, body: &[u8]) -> ApiResult<Address> {
    let authorization = match headers.get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };
    state
        .authenticator
        .authenticate(authorization, body)
        .map_err(|e| {
            debug!(error = %e, "Request authentication failed");
            ApiError::from(e)
        })
}

/// Run a synchronous registry call off the async workers.
async fn blocking<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    F: FnOnce(&dyn ProposalRegistryApi) -> Result<T, RegistryError> + Send + 'static,
    T: Send + 'static,
{
    let registry = Arc::clone(&state.registry);
    tokio::task::spawn_blocking(move || call(registry.as_ref()))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
}

/// Apply the per-identity throttle if the action class is switched on.
fn throttle(
    state: &AppState,
    caller: &Address,
    action: ActionClass,
    service_type: &str,
) -> ApiResult<()> {
    if !state.flags.throttle_enabled(action) {
        return Ok(());
    }
    let key = ThrottleKey::new(caller.to_canonical(), action, service_type);
    state
        .throttle
        .check_and_record(key, state.throttle_config.window_for(action))
        .map_err(|e| {
            warn!(
                identity = %caller,
                action = %action,
                service_type,
                retry_after_ms = e.retry_after().as_millis() as u64,
                "Action throttled"
            );
            ApiError::from(e)
        })
}

/// `POST /v1/identities`
pub async fn create_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let caller = authenticate(&state, &headers, &body)?;
    blocking(&state, move |registry| registry.create_identity(&caller)).await?;
    Ok(acknowledged())
}

/// `POST /v1/register_proposal`
pub async fn register_proposal(
    State(state): State<AppState>,
    Extension(client_ip): Extension<ClientIp>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload = parse_object(&body)?;
    let caller = authenticate(&state, &headers, &body)?;

    let request = state.registry.validate_registration(&caller, payload).await?;
    throttle(&state, &caller, ActionClass::Register, &request.key.service_type)?;

    let ip = client_ip.to_record();
    blocking(&state, move |registry| registry.apply_registration(request, ip)).await?;
    Ok(acknowledged())
}

/// `POST /v1/unregister_proposal`
pub async fn unregister_proposal(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload = parse_object(&body)?;
    let caller = authenticate(&state, &headers, &body)?;

    blocking(&state, move |registry| registry.unregister(&caller, &payload)).await?;
    Ok(acknowledged())
}

/// `POST /v1/ping_proposal`
///
/// Liveness is refreshed before returning; the ping record itself is
/// queued and persisted later.
pub async fn ping_proposal(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload = parse_object(&body)?;
    let caller = authenticate(&state, &headers, &body)?;

    let key = blocking(&state, move |registry| {
        registry.resolve_ping_target(&caller, &payload)
    })
    .await?;
    throttle(&state, &caller, ActionClass::Ping, &key.service_type)?;
    let key = blocking(&state, move |registry| {
        registry.mark_activity(&key)?;
        Ok(key)
    })
    .await?;

    let record = NodeAvailability::new(&key, state.clock.now());
    if let Err(e) = state.availability.enqueue(record) {
        // The node is already marked active; only the audit row is lost.
        warn!(provider = %key.provider, service_type = %key.service_type, error = %e, "Ping record not queued");
    }
    Ok(acknowledged())
}

/// `POST /v1/node_send_stats`
pub async fn node_send_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload = parse_object(&body)?;
    let caller = authenticate(&state, &headers, &body)?;

    let key = blocking(&state, move |registry| {
        registry.resolve_session_target(&caller, &payload)
    })
    .await?;
    throttle(&state, &caller, ActionClass::SessionStats, &key.service_type)?;
    let key = blocking(&state, move |registry| {
        registry.mark_activity(&key)?;
        Ok(key)
    })
    .await?;
    debug!(provider = %key.provider, service_type = %key.service_type, "Session stats received");
    Ok(acknowledged())
}

/// Query string of `GET /v1/proposals`.
#[derive(Debug, Default, Deserialize)]
pub struct ProposalsQuery {
    pub node_key: Option<String>,
    pub service_type: Option<String>,
    pub node_type: Option<String>,
    pub access_policy: Option<String>,
    #[serde(rename = "access_policy[id]")]
    pub access_policy_id: Option<String>,
    #[serde(rename = "access_policy[source]")]
    pub access_policy_source: Option<String>,
    pub bounty_only: Option<String>,
}

impl ProposalsQuery {
    pub fn into_filter(self) -> ProposalFilter {
        ProposalFilter {
            node_key: self
                .node_key
                .filter(|k| !k.is_empty())
                .map(ProviderId::new),
            service_type: ServiceTypeFilter::from_param(self.service_type.as_deref()),
            node_type: self.node_type.filter(|t| !t.is_empty()),
            access_policy: AccessPolicyFilter::from_params(
                self.access_policy.as_deref(),
                self.access_policy_id.as_deref(),
                self.access_policy_source.as_deref(),
            ),
            bounty_only: self.bounty_only.as_deref().map_or(false, is_truthy),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// `GET /v1/proposals`
pub async fn list_proposals(
    State(state): State<AppState>,
    Query(query): Query<ProposalsQuery>,
) -> ApiResult<Json<Value>> {
    let filter = query.into_filter();
    let nodes = blocking(&state, move |registry| registry.list_active(&filter)).await?;
    debug!(matched = nodes.len(), "Proposals listed");
    let proposals: Vec<Value> = nodes.into_iter().map(|node| node.proposal).collect();
    Ok(Json(json!({ "proposals": proposals })))
}

/// `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
