//! Circuit breaker configuration.
//!
//! Defines the failure-rate threshold, evaluation window, and recovery
//! timing for one breaker. Immutable after construction.

use crate::constants;
use std::time::Duration;

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failure rate (percent of window requests) that opens the circuit.
    pub failure_threshold_pct: f64,
    /// Minimum requests in the window before the rate is evaluated.
    pub minimum_requests: u32,
    /// Length of the fixed, non-overlapping evaluation window.
    pub window_duration: Duration,
    /// Time the circuit stays open before probing recovery.
    pub open_duration: Duration,
    /// Consecutive successes required to close from half-open.
    pub success_threshold: u32,
    /// Per-call timeout for the guarded operation.
    pub operation_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold_pct: constants::DEFAULT_FAILURE_THRESHOLD_PCT,
            minimum_requests: constants::DEFAULT_MINIMUM_REQUESTS,
            window_duration: Duration::from_millis(constants::DEFAULT_WINDOW_DURATION_MS),
            open_duration: Duration::from_millis(constants::DEFAULT_OPEN_DURATION_MS),
            success_threshold: constants::DEFAULT_SUCCESS_THRESHOLD,
            operation_timeout: Duration::from_millis(constants::DEFAULT_OPERATION_TIMEOUT_MS),
        }
    }
}
