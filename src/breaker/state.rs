//! Circuit breaker state machine states.
//!
//! - **Closed**: Normal operation, requests allowed
//! - **Open**: Failure rate tripped the threshold, requests rejected
//! - **HalfOpen**: Testing recovery - probes admitted, one failure reopens

use serde::Serialize;

/// Circuit breaker state.
///
/// Exactly one state holds at any instant. Counters live in the breaker
/// core, not in the state itself, because every transition resets the
/// evaluation window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed - requests allowed.
    #[default]
    Closed,
    /// Circuit is open - requests rejected until the recovery timer fires.
    Open,
    /// Circuit is half-open - admitting probes to test recovery.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        };
        f.write_str(name)
    }
}

/// Kind of failure recorded against the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The guarded operation returned an error.
    Error,
    /// The guarded operation exceeded the configured timeout.
    Timeout,
}
