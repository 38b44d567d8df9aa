//! Circuit breaker error types.
//!
//! Three failure shapes reach the caller: the call was rejected because the
//! circuit is open, the guarded operation timed out, or the operation
//! failed with its own error (propagated unchanged).

use std::time::Duration;

/// Error returned when a call is rejected because the circuit is open.
#[derive(Debug, Clone, thiserror::Error)]
#[error("circuit breaker '{name}' is open ({rejected} rejected this window)")]
pub struct CircuitOpenError {
    /// Name of the rejecting breaker.
    pub name: String,
    /// Calls rejected in the current window, including this one.
    pub rejected: u64,
}

/// Error returned when the guarded operation exceeded its timeout.
#[derive(Debug, Clone, thiserror::Error)]
#[error("operation guarded by '{name}' timed out after {timeout:?}")]
pub struct CircuitTimeoutError {
    /// Name of the guarding breaker.
    pub name: String,
    /// The configured operation timeout.
    pub timeout: Duration,
}

/// Error returned by [`CircuitBreaker::execute`](super::CircuitBreaker::execute).
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Call rejected: the circuit is open.
    #[error(transparent)]
    Open(#[from] CircuitOpenError),
    /// The guarded operation exceeded the configured timeout.
    #[error(transparent)]
    Timeout(#[from] CircuitTimeoutError),
    /// The guarded operation failed; its error is propagated unchanged.
    #[error("guarded operation failed")]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    /// True if the call was rejected because the circuit is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// True if the guarded operation timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The wrapped operation's error, if that is what failed.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(err) => Some(err),
            _ => None,
        }
    }

    /// Unwrap the operation's error, discarding breaker-generated errors.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(err) => Some(err),
            _ => None,
        }
    }
}
