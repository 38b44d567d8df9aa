//! Circuit breaker with failure-rate evaluation over a fixed window.
//!
//! One breaker guards one named dependency. All mutable state sits behind a
//! single mutex that is never held across an await, so slow guarded calls
//! do not block other callers from being admitted, rejected, or recorded.
//!
//! ## States
//!
//! - **Closed**: Normal operation. Outcomes are counted in a fixed,
//!   non-overlapping window; once the window holds at least
//!   `minimum_requests` calls and the failure rate reaches
//!   `failure_threshold_pct`, the circuit opens.
//! - **Open**: Every call is rejected immediately. An owned recovery timer
//!   fires the transition to half-open after `open_duration`.
//! - **`HalfOpen`**: Probes are admitted. `success_threshold` consecutive
//!   successes close the circuit; a single failure reopens it immediately,
//!   with no minimum-requests gate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tripswitch::{CircuitBreaker, CircuitBreakerConfig};
//!
//! let breaker = CircuitBreaker::new("inventory-api");
//!
//! let result = breaker
//!     .execute(|| async { call_inventory_service().await })
//!     .await;
//! ```

mod config;
mod error;
mod events;
mod state;
mod status;


pub use config::CircuitBreakerConfig;
pub use error::{CircuitBreakerError, CircuitOpenError, CircuitTimeoutError};
pub use events::{handler_fn, CircuitEvent, CircuitEventHandler, LoggingEventHandler};
pub use state::{CircuitState, FailureKind};
pub use status::{BreakerMetrics, BreakerStatus, WindowSnapshot};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

/// Circuit breaker guarding one named dependency.
///
/// Thread-safe and cheap to clone; clones share the same state. State
/// transitions are serialized through a single internal lock, so two
/// concurrent failures cannot both miss the threshold evaluation and a
/// transition is applied at most once per triggering event.
#[derive(Clone)]
pub struct CircuitBreaker {
    inner: Arc<Inner>,
}

struct Inner {
    name: Arc<str>,
    config: CircuitBreakerConfig,
    core: Mutex<Core>,
    observers: Mutex<Vec<Arc<dyn CircuitEventHandler>>>,
    /// Handed to the recovery timer task so a dropped breaker never keeps
    /// itself alive through its own timer.
    weak_self: Weak<Inner>,
    created_at: Instant,
    created_wall: DateTime<Utc>,
}

/// Mutable breaker state. Every read-modify-write happens under one lock.
struct Core {
    state: CircuitState,
    /// Counters for the current evaluation window. Reset on rollover and
    /// on every state transition.
    window: WindowSnapshot,
    window_start: Instant,
    /// Unbroken successes since entering half-open. Meaningless elsewhere.
    consecutive_successes: u32,
    /// Owned recovery timer; exists only while open.
    recovery_timer: Option<JoinHandle<()>>,
    /// Bumped each time the circuit opens. A timer that fires with a stale
    /// epoch (after a forced transition rescheduled or cancelled it) is a
    /// no-op.
    open_epoch: u64,
    lifetime: LifetimeStats,
    shut_down: bool,
}

/// Statistics that survive window rollover. Only `reset_stats` zeroes them.
#[derive(Debug, Clone, Copy)]
struct LifetimeStats {
    state_change_count: u64,
    total_requests: u64,
    total_successes: u64,
    total_failures: u64,
    last_state_change_at: DateTime<Utc>,
}

impl Default for CircuitBreaker {
    /// Anonymous breaker with default configuration.
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_BREAKER_NAME)
    }
}

impl CircuitBreaker {
    /// Create a breaker with default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom configuration.
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let now = Utc::now();
        let name: Arc<str> = Arc::from(name.into());
        let inner = Arc::new_cyclic(|weak_self| Inner {
            name,
            config,
            core: Mutex::new(Core {
                state: CircuitState::Closed,
                window: WindowSnapshot::default(),
                window_start: Instant::now(),
                consecutive_successes: 0,
                recovery_timer: None,
                open_epoch: 0,
                lifetime: LifetimeStats {
                    state_change_count: 0,
                    total_requests: 0,
                    total_successes: 0,
                    total_failures: 0,
                    last_state_change_at: now,
                },
                shut_down: false,
            }),
            observers: Mutex::new(Vec::new()),
            weak_self: Weak::clone(weak_self),
            created_at: Instant::now(),
            created_wall: now,
        });
        Self { inner }
    }

    /// Name of the dependency this breaker guards.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current state. Prefer [`status`](Self::status) for a full snapshot.
    pub fn state(&self) -> CircuitState {
        self.inner.core.lock().state
    }

    /// This breaker's configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.inner.config
    }

    /// Register an observer for this breaker's events.
    ///
    /// Dispatch is synchronous on the task that triggered the event, after
    /// the breaker's internal lock is released. [`shutdown`](Self::shutdown)
    /// detaches all observers.
    pub fn subscribe(&self, handler: Arc<dyn CircuitEventHandler>) {
        self.inner.observers.lock().push(handler);
    }

    /// Run `operation` under this breaker's protection.
    ///
    /// If the circuit is open the call is rejected immediately with
    /// [`CircuitBreakerError::Open`] and the operation never runs. Otherwise
    /// the operation races the configured `operation_timeout`; on timeout
    /// the losing future is dropped (cancelled) and the outcome counts as a
    /// failure of kind [`FailureKind::Timeout`]. Operation errors are
    /// propagated unchanged inside [`CircuitBreakerError::Inner`].
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.inner.admit()?;

        match tokio::time::timeout(self.inner.config.operation_timeout, operation()).await {
            Ok(Ok(value)) => {
                self.inner.record_success();
                Ok(value)
            },
            Ok(Err(err)) => {
                self.inner.record_failure(FailureKind::Error);
                Err(CircuitBreakerError::Inner(err))
            },
            Err(_elapsed) => {
                self.inner.record_failure(FailureKind::Timeout);
                Err(CircuitTimeoutError {
                    name: self.inner.name.to_string(),
                    timeout: self.inner.config.operation_timeout,
                }
                .into())
            },
        }
    }

    /// Like [`execute`](Self::execute), but rejections, failures, and
    /// timeouts are locally recovered by running `fallback` (same signature
    /// as the operation) and returning its result instead of propagating.
    ///
    /// The breaker's counters reflect the primary operation's outcome only;
    /// the fallback is invisible to the state machine.
    pub async fn execute_with_fallback<F, Fut, G, GFut, T, E>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = Result<T, E>>,
    {
        match self.execute(operation).await {
            Ok(value) => Ok(value),
            Err(_rejected_or_failed) => fallback().await.map_err(CircuitBreakerError::Inner),
        }
    }

    /// Administrative override: open the circuit now.
    ///
    /// Runs the same transition logic as an automatic open, including
    /// arming the recovery timer, so a forced-open circuit still probes
    /// recovery after `open_duration`. Calling this while already open
    /// restarts the open period.
    ///
    /// Must be called from within a Tokio runtime (the recovery timer is a
    /// spawned task).
    pub fn force_open(&self) {
        let mut events = Vec::new();
        {
            let mut core = self.inner.core.lock();
            if core.shut_down {
                return;
            }
            self.inner.open_circuit(&mut core, &mut events);
        }
        self.inner.emit_all(&events);
    }

    /// Administrative override: close the circuit now.
    ///
    /// Cancels any pending recovery timer and resets the window. No-op if
    /// the circuit is already closed.
    pub fn force_close(&self) {
        let mut events = Vec::new();
        {
            let mut core = self.inner.core.lock();
            if core.shut_down || core.state == CircuitState::Closed {
                return;
            }
            self.inner.close_circuit(&mut core, &mut events);
        }
        self.inner.emit_all(&events);
    }

    /// Full point-in-time snapshot. Pure read; never mutates the breaker.
    pub fn status(&self) -> BreakerStatus {
        let core = self.inner.core.lock();
        let total = core.window.total;
        BreakerStatus {
            name: self.inner.name.to_string(),
            state: core.state,
            window: core.window,
            failure_rate: rate(core.window.failed, total),
            success_rate: rate(core.window.successful, total),
            consecutive_successes: core.consecutive_successes,
            window_age_ms: millis(core.window_start.elapsed()),
            lifetime: self.inner.metrics_locked(&core),
            uptime_ms: millis(self.inner.created_at.elapsed()),
        }
    }

    /// Lifetime-only view (no window detail). Pure read.
    pub fn metrics(&self) -> BreakerMetrics {
        let core = self.inner.core.lock();
        self.inner.metrics_locked(&core)
    }

    /// Zero lifetime statistics and the current window.
    ///
    /// Never changes state, the recovery timer, or half-open progress.
    pub fn reset_stats(&self) {
        let mut core = self.inner.core.lock();
        core.window = WindowSnapshot::default();
        core.window_start = Instant::now();
        core.lifetime.state_change_count = 0;
        core.lifetime.total_requests = 0;
        core.lifetime.total_successes = 0;
        core.lifetime.total_failures = 0;
        info!("Circuit breaker '{}' statistics reset", self.inner.name);
    }

    /// Cancel any pending recovery timer and detach all observers.
    ///
    /// Idempotent. The breaker remains usable afterwards but will no longer
    /// transition out of open automatically or notify observers.
    pub fn shutdown(&self) {
        {
            let mut core = self.inner.core.lock();
            if core.shut_down {
                return;
            }
            core.shut_down = true;
            if let Some(timer) = core.recovery_timer.take() {
                timer.abort();
            }
        }
        self.inner.observers.lock().clear();
        info!("Circuit breaker '{}' shut down", self.inner.name);
    }
}

impl Inner {
    /// Admission check. Open circuits reject immediately; the rejection is
    /// tracked separately from the window total and never feeds the
    /// failure-rate evaluation.
    fn admit(&self) -> Result<(), CircuitOpenError> {
        let event;
        let err;
        {
            let mut core = self.core.lock();
            match core.state {
                CircuitState::Closed | CircuitState::HalfOpen => return Ok(()),
                CircuitState::Open => {
                    core.window.rejected += 1;
                    let rejected = core.window.rejected;
                    event = CircuitEvent::Reject {
                        name: Arc::clone(&self.name),
                        rejected,
                    };
                    err = CircuitOpenError {
                        name: self.name.to_string(),
                        rejected,
                    };
                },
            }
        }
        self.emit_all(&[event]);
        Err(err)
    }

    fn record_success(&self) {
        let mut events = Vec::with_capacity(2);
        {
            let mut core = self.core.lock();
            self.maybe_roll_window(&mut core);
            core.window.total += 1;
            core.window.successful += 1;
            core.lifetime.total_requests += 1;
            core.lifetime.total_successes += 1;

            if core.state == CircuitState::HalfOpen {
                core.consecutive_successes += 1;
            }
            events.push(CircuitEvent::Success {
                name: Arc::clone(&self.name),
                successful: core.window.successful,
                consecutive_successes: core.consecutive_successes,
            });

            if core.state == CircuitState::HalfOpen
                && core.consecutive_successes >= self.config.success_threshold
            {
                self.close_circuit(&mut core, &mut events);
            }
        }
        self.emit_all(&events);
    }

    fn record_failure(&self, kind: FailureKind) {
        let mut events = Vec::with_capacity(2);
        {
            let mut core = self.core.lock();
            self.maybe_roll_window(&mut core);
            core.window.total += 1;
            core.window.failed += 1;
            if kind == FailureKind::Timeout {
                core.window.timed_out += 1;
            }
            core.lifetime.total_requests += 1;
            core.lifetime.total_failures += 1;

            events.push(CircuitEvent::Failure {
                name: Arc::clone(&self.name),
                kind,
                failed: core.window.failed,
                total: core.window.total,
            });

            match core.state {
                CircuitState::Closed => {
                    // Threshold evaluation is synchronous with the recorded
                    // failure, against the current (possibly just-rolled)
                    // window.
                    let total = core.window.total;
                    if total >= u64::from(self.config.minimum_requests)
                        && rate(core.window.failed, total) >= self.config.failure_threshold_pct
                    {
                        self.open_circuit(&mut core, &mut events);
                    }
                },
                CircuitState::HalfOpen => {
                    // A single failure while probing is proof the dependency
                    // is still unhealthy. No minimum-requests gate here.
                    self.open_circuit(&mut core, &mut events);
                },
                // Late completion of a call admitted before the circuit
                // opened; counted, but no further evaluation.
                CircuitState::Open => {},
            }
        }
        self.emit_all(&events);
    }

    /// Fixed, non-overlapping window: while closed, counters reset to zero
    /// once `window_duration` has elapsed since `window_start`.
    fn maybe_roll_window(&self, core: &mut Core) {
        if core.state == CircuitState::Closed
            && core.window_start.elapsed() >= self.config.window_duration
        {
            core.window = WindowSnapshot::default();
            core.window_start = Instant::now();
        }
    }

    fn reset_window(core: &mut Core) {
        core.window = WindowSnapshot::default();
        core.window_start = Instant::now();
    }

    /// Record a state change. Counts only actual changes, so a forced open
    /// on an already-open circuit restarts the timer without inflating
    /// `state_change_count`.
    fn set_state(&self, core: &mut Core, next: CircuitState) {
        if core.state != next {
            core.state = next;
            core.lifetime.state_change_count += 1;
            core.lifetime.last_state_change_at = Utc::now();
        }
    }

    /// Transition to open: reset the window and half-open progress, arm the
    /// recovery timer. Caller holds the core lock.
    fn open_circuit(&self, core: &mut Core, events: &mut Vec<CircuitEvent>) {
        let total = core.window.total;
        let failure_rate = rate(core.window.failed, total);
        warn!(
            "Circuit breaker '{}' opening (failure rate {:.1}% over {} requests)",
            self.name, failure_rate, total
        );
        self.set_state(core, CircuitState::Open);
        core.consecutive_successes = 0;
        Self::reset_window(core);
        self.arm_recovery_timer(core);
        events.push(CircuitEvent::Open {
            name: Arc::clone(&self.name),
            failure_rate,
            total,
        });
    }

    /// Transition to closed: cancel any residual timer, reset the window.
    /// Caller holds the core lock.
    fn close_circuit(&self, core: &mut Core, events: &mut Vec<CircuitEvent>) {
        info!("Circuit breaker '{}' closing", self.name);
        if let Some(timer) = core.recovery_timer.take() {
            timer.abort();
        }
        self.set_state(core, CircuitState::Closed);
        core.consecutive_successes = 0;
        Self::reset_window(core);
        events.push(CircuitEvent::Close {
            name: Arc::clone(&self.name),
        });
    }

    /// Replace the recovery timer with a fresh one for the current open
    /// episode. The task holds only a weak reference, so a dropped breaker
    /// never outlives its callers.
    fn arm_recovery_timer(&self, core: &mut Core) {
        if let Some(old) = core.recovery_timer.take() {
            old.abort();
        }
        core.open_epoch += 1;
        let epoch = core.open_epoch;
        let delay = self.config.open_duration;
        let weak = Weak::clone(&self.weak_self);
        core.recovery_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.recovery_elapsed(epoch);
            }
        }));
    }

    /// Recovery timer callback: `Open -> HalfOpen`, exactly once per open
    /// episode. Takes the same lock as every other mutation, so a late
    /// firing after a forced transition is a no-op (stale epoch).
    fn recovery_elapsed(&self, epoch: u64) {
        let mut events = Vec::with_capacity(1);
        {
            let mut core = self.core.lock();
            if core.shut_down || core.open_epoch != epoch || core.state != CircuitState::Open {
                return;
            }
            info!("Circuit breaker '{}' transitioning to half-open", self.name);
            self.set_state(&mut core, CircuitState::HalfOpen);
            core.consecutive_successes = 0;
            Self::reset_window(&mut core);
            core.recovery_timer = None;
            events.push(CircuitEvent::HalfOpen {
                name: Arc::clone(&self.name),
            });
        }
        self.emit_all(&events);
    }

    fn metrics_locked(&self, core: &Core) -> BreakerMetrics {
        BreakerMetrics {
            total_requests: core.lifetime.total_requests,
            total_successes: core.lifetime.total_successes,
            total_failures: core.lifetime.total_failures,
            success_rate: rate(core.lifetime.total_successes, core.lifetime.total_requests),
            state_change_count: core.lifetime.state_change_count,
            last_state_change_at: core.lifetime.last_state_change_at,
            created_at: self.created_wall,
        }
    }

    /// Dispatch events to observers. Called with the core lock released so
    /// a handler may freely read the breaker back.
    fn emit_all(&self, events: &[CircuitEvent]) {
        if events.is_empty() {
            return;
        }
        let handlers = self.observers.lock().clone();
        for event in events {
            for handler in &handlers {
                handler.on_event(event);
            }
        }
    }
}

/// Percentage of `part` in `total`; `0.0` for an empty total.
fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[allow(clippy::cast_possible_truncation)] // ms fits u64 for any realistic uptime
fn millis(duration: std::time::Duration) -> u64 {
    duration.as_millis() as u64
}
