//! Read-only status and metrics views.
//!
//! These are snapshots intended to be serialized by a thin HTTP layer
//! (not part of this crate). Producing one never mutates the breaker.

use super::state::CircuitState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters for the current evaluation window.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WindowSnapshot {
    /// Calls that actually executed (successful + failed + timed out).
    pub total: u64,
    /// Calls that completed successfully.
    pub successful: u64,
    /// Calls that failed, including timeouts.
    pub failed: u64,
    /// Subset of `failed` that were timeouts.
    pub timed_out: u64,
    /// Calls rejected while the circuit was open. Not part of `total`;
    /// rejections never feed the failure-rate evaluation.
    pub rejected: u64,
}

/// Full point-in-time view of one breaker.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStatus {
    /// Breaker name (unique within its manager).
    pub name: String,
    /// Current state.
    pub state: CircuitState,
    /// Counters for the current window.
    pub window: WindowSnapshot,
    /// `failed / total` as a percentage; `0.0` when the window is empty.
    pub failure_rate: f64,
    /// `successful / total` as a percentage; `0.0` when the window is empty.
    pub success_rate: f64,
    /// Unbroken successes since entering half-open; zero elsewhere.
    pub consecutive_successes: u32,
    /// Milliseconds since the current window started.
    pub window_age_ms: u64,
    /// Lifetime statistics, never reset by window rollover.
    pub lifetime: BreakerMetrics,
    /// Milliseconds since this breaker was created.
    pub uptime_ms: u64,
}

/// Lifetime-only view of one breaker (no window detail).
#[derive(Debug, Clone, Serialize)]
pub struct BreakerMetrics {
    /// Executed calls over the breaker's lifetime.
    pub total_requests: u64,
    /// Lifetime successes.
    pub total_successes: u64,
    /// Lifetime failures, including timeouts.
    pub total_failures: u64,
    /// `total_successes / total_requests` as a percentage; `0.0` when idle.
    pub success_rate: f64,
    /// State transitions since creation (including forced ones).
    pub state_change_count: u64,
    /// Wall-clock time of the most recent state change.
    pub last_state_change_at: DateTime<Utc>,
    /// Wall-clock time this breaker was created.
    pub created_at: DateTime<Utc>,
}
