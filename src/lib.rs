// =============================================================================
// Lint Configuration
// =============================================================================

// Safety: no unsafe code anywhere in this crate
#![deny(unsafe_code)]
// Correctness: Must handle all fallible operations
#![deny(unused_must_use)]
// Quality: Pedantic but pragmatic
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
// Allowed with documented reasons
#![allow(clippy::missing_errors_doc)] // Error returns self-documenting via type
#![allow(clippy::module_name_repetitions)] // e.g., breaker::CircuitBreakerConfig is clearer
#![allow(clippy::must_use_candidate)] // Not all returned values need annotation
#![allow(clippy::cast_precision_loss)] // Intentional in failure-rate percentages

//! Process-local circuit breaker with a named-breaker registry.
//!
//! A [`CircuitBreaker`] guards one named dependency: it tracks outcomes over
//! a fixed evaluation window, stops calling the dependency once the failure
//! rate trips a threshold, and probes recovery after a cooldown. The
//! [`CircuitBreakerManager`] is an in-memory registry that creates breakers
//! on demand and aggregates their health.
//!
//! # Example
//!
//! ```no_run
//! use tripswitch::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let breaker = CircuitBreaker::with_config(
//!     "payments-db",
//!     CircuitBreakerConfig {
//!         minimum_requests: 5,
//!         open_duration: Duration::from_secs(10),
//!         ..Default::default()
//!     },
//! );
//!
//! let result = breaker.execute(|| async { Ok::<_, std::io::Error>(42) }).await;
//! # let _ = result;
//! # }
//! ```

/// Circuit breaker state machine and execution path.
///
/// One [`breaker::CircuitBreaker`] per guarded dependency. Thread-safe;
/// cheap to clone via an internal `Arc`.
pub mod breaker;

/// Named registry of circuit breakers with bulk lifecycle operations.
pub mod manager;

/// Centralized defaults for thresholds and timeouts.
///
/// All magic numbers live here with documented rationale so tuning does
/// not require a code search.
pub mod constants;

pub use breaker::{
    handler_fn, BreakerMetrics, BreakerStatus, CircuitBreaker, CircuitBreakerConfig,
    CircuitBreakerError, CircuitEvent, CircuitEventHandler, CircuitOpenError, CircuitState,
    CircuitTimeoutError, FailureKind, LoggingEventHandler, WindowSnapshot,
};
pub use manager::{BreakerSummary, CircuitBreakerManager, HealthOverview};
