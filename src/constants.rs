//! Centralized defaults for thresholds and timeouts.
//!
//! All magic numbers in the crate are defined here with documented
//! rationale. This enables:
//! - Consistent defaults across modules
//! - Easy tuning without code search

// =============================================================================
// Circuit Breaker Defaults
// =============================================================================

/// Failure rate (percent of window requests) that opens the circuit.
/// Rationale: half the traffic failing indicates a real outage, not noise.
pub const DEFAULT_FAILURE_THRESHOLD_PCT: f64 = 50.0;

/// Minimum requests in the window before the failure rate is evaluated.
/// Rationale: prevents opening on statistically insignificant samples
/// (e.g. one failure out of one request is a 100% rate).
pub const DEFAULT_MINIMUM_REQUESTS: u32 = 10;

/// Length of the fixed evaluation window (60 seconds).
/// Rationale: long enough to smooth bursts, short enough that stale
/// failures do not keep the circuit trigger-happy.
pub const DEFAULT_WINDOW_DURATION_MS: u64 = 60_000;

/// Time the circuit stays open before probing recovery (30 seconds).
/// Rationale: matches typical transient-outage and restart durations.
pub const DEFAULT_OPEN_DURATION_MS: u64 = 30_000;

/// Consecutive successes required to close from half-open.
/// Rationale: one success can be luck; three confirms recovery.
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 3;

/// Per-call timeout for the guarded operation (5 seconds).
/// Rationale: a dependency slower than this is treated as failing.
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;

/// Breaker name used when the caller does not supply one.
pub const DEFAULT_BREAKER_NAME: &str = "default";
