//! # Error Types
//!
//! Errors shared across discovery components.

use std::time::Duration;
use thiserror::Error;

/// Errors from parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Hex digit count is not 40.
    #[error("invalid address length: {0} hex digits")]
    InvalidLength(usize),

    /// Non-hex characters.
    #[error("invalid address hex: {0}")]
    InvalidHex(String),
}

/// Rejection from the action throttle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThrottleError {
    /// The same identity performed the same action inside the window.
    #[error("too many requests")]
    TooManyRequests {
        /// Time until the next attempt would be accepted.
        retry_after: Duration,
    },
}

impl ThrottleError {
    pub fn retry_after(&self) -> Duration {
        match self {
            ThrottleError::TooManyRequests { retry_after } => *retry_after,
        }
    }
}
