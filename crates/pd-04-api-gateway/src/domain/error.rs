//! Gateway error types and their HTTP rendering.
//!
//! Every failure leaves the gateway as `{"error": "<message>"}`. The message
//! of a client error is the domain error's own text; collaborator failures
//! are logged and collapsed into `internal error`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use pd_01_signature_auth::AuthError;
use pd_02_proposal_registry::RegistryError;
use shared_types::ThrottleError;
use std::fmt;
use std::time::Duration;
use tracing::error;

pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";
pub const FORBIDDEN_MESSAGE: &str = "resource is forbidden";

/// HTTP-facing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Sent as `Retry-After`, rounded up to whole seconds.
    pub retry_after: Option<Duration>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Caller address is not on the allow-list.
    pub fn forbidden_ip() -> Self {
        Self::forbidden(FORBIDDEN_MESSAGE)
    }

    pub fn too_many_requests(retry_after: Duration) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "too many requests".to_string(),
            retry_after: Some(retry_after),
        }
    }

    /// Log `details` and hide them from the caller.
    pub fn internal(details: impl fmt::Display) -> Self {
        error!(error = %details, "Request failed with internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        let mut response = (self.status, body).into_response();
        if let Some(retry_after) = self.retry_after {
            let secs = retry_after.as_millis().div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::unauthorized(e.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::InvalidPayload
            | RegistryError::MissingServiceProposal
            | RegistryError::MissingProviderId
            | RegistryError::MissingServiceType
            | RegistryError::NodeNotFound => ApiError::bad_request(e.to_string()),
            RegistryError::IdentityMismatch
            | RegistryError::UnregisteredIdentity
            | RegistryError::IdentityAlreadyExists => ApiError::forbidden(e.to_string()),
            RegistryError::Oracle(_) | RegistryError::Store(_) => ApiError::internal(e),
        }
    }
}

impl From<ThrottleError> for ApiError {
    fn from(e: ThrottleError) -> Self {
        ApiError::too_many_requests(e.retry_after())
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and serving, never sent to clients)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server bind error: {0}")]
    Bind(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("availability pipeline error: {0}")]
    Pipeline(String),
}
