//! Client address resolution and the restrict-by-IP guard.
//!
//! Every request gets a [`ClientIp`] extension so handlers can record the
//! observed source address. When restriction is on, mutating requests from
//! addresses outside the allow-list are answered with 403 before they reach
//! a handler. Reads stay open.

use crate::domain::config::SecurityConfig;
use crate::domain::error::ApiError;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Source address of the request, if one could be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    pub fn to_record(self) -> Option<String> {
        self.0.map(|ip| ip.to_string())
    }
}

#[derive(Debug)]
struct GuardPolicy {
    restrict: bool,
    allowed: HashSet<IpAddr>,
    trust_forwarded_for: bool,
}

impl GuardPolicy {
    fn admits(&self, method: &Method, ip: Option<IpAddr>) -> bool {
        if !self.restrict || method == Method::GET || method == Method::HEAD {
            return true;
        }
        ip.map_or(false, |ip| self.allowed.contains(&ip))
    }
}

#[derive(Clone)]
pub struct IpGuardLayer {
    policy: Arc<GuardPolicy>,
}

impl IpGuardLayer {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            policy: Arc::new(GuardPolicy {
                restrict: config.restrict_by_ip,
                allowed: config.allowed_ips.clone(),
                trust_forwarded_for: config.trust_forwarded_for,
            }),
        }
    }
}

impl<S> Layer<S> for IpGuardLayer {
    type Service = IpGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IpGuardService {
            inner,
            policy: Arc::clone(&self.policy),
        }
    }
}

#[derive(Clone)]
pub struct IpGuardService<S> {
    inner: S,
    policy: Arc<GuardPolicy>,
}

impl<S> Service<Request<Body>> for IpGuardService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let policy = Arc::clone(&self.policy);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ip = extract_client_ip(&req, policy.trust_forwarded_for);

            if !policy.admits(req.method(), ip) {
                warn!(
                    ip = ?ip,
                    path = %req.uri().path(),
                    "Request from address outside allow-list rejected"
                );
                return Ok(ApiError::forbidden_ip().into_response());
            }

            req.extensions_mut().insert(ClientIp(ip));
            inner.call(req).await
        })
    }
}

/// Resolve the client address. Forwarding headers are consulted only when
/// trusted; otherwise the socket peer address is used.
pub fn extract_client_ip<B>(req: &Request<B>, trust_forwarded_for: bool) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = req
            .headers()
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if real_ip.is_some() {
            return real_ip;
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}
