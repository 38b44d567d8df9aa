//! Typed breaker events and the observer interface.
//!
//! The breaker publishes one event per recorded outcome and one per state
//! transition. Dispatch is synchronous, happens after the breaker's core
//! lock is released, and carries no ordering guarantee across breakers.

use super::state::FailureKind;
use std::sync::Arc;
use tracing::{info, warn};

/// Event published by a circuit breaker.
///
/// Each variant carries the breaker name and the counters relevant to the
/// event, captured at the moment it was recorded.
#[derive(Debug, Clone)]
pub enum CircuitEvent {
    /// A guarded call succeeded.
    Success {
        name: Arc<str>,
        /// Window successes, including this one.
        successful: u64,
        /// Unbroken half-open successes; zero outside half-open.
        consecutive_successes: u32,
    },
    /// A guarded call failed or timed out.
    Failure {
        name: Arc<str>,
        kind: FailureKind,
        /// Window failures, including this one.
        failed: u64,
        /// Window total, including this call.
        total: u64,
    },
    /// A call was rejected because the circuit is open.
    Reject {
        name: Arc<str>,
        /// Window rejections, including this one.
        rejected: u64,
    },
    /// The circuit opened.
    Open {
        name: Arc<str>,
        /// Failure rate of the window that tripped the threshold.
        failure_rate: f64,
        /// Total requests in that window.
        total: u64,
    },
    /// The recovery timer fired; the circuit is probing.
    HalfOpen { name: Arc<str> },
    /// The circuit closed after successful recovery.
    Close { name: Arc<str> },
}

impl CircuitEvent {
    /// Name of the breaker that published this event.
    pub fn breaker_name(&self) -> &str {
        match self {
            Self::Success { name, .. }
            | Self::Failure { name, .. }
            | Self::Reject { name, .. }
            | Self::Open { name, .. }
            | Self::HalfOpen { name }
            | Self::Close { name } => name,
        }
    }
}

/// Observer notified of breaker events.
///
/// Handlers run on the caller's task during event dispatch and must not
/// block. They must not assume delivery order across breakers.
pub trait CircuitEventHandler: Send + Sync {
    fn on_event(&self, event: &CircuitEvent);
}

/// Built-in handler that logs transitions via `tracing`.
///
/// Outcome events (`Success`, `Failure`, `Reject`) are left to the
/// breaker's own trace-level logging; this handler only reports the
/// transitions an operator cares about.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventHandler;

impl CircuitEventHandler for LoggingEventHandler {
    fn on_event(&self, event: &CircuitEvent) {
        match event {
            CircuitEvent::Open {
                name,
                failure_rate,
                total,
            } => {
                warn!(
                    "Circuit breaker '{}' opened (failure rate {:.1}% over {} requests)",
                    name, failure_rate, total
                );
            },
            CircuitEvent::HalfOpen { name } => {
                info!("Circuit breaker '{}' transitioning to half-open", name);
            },
            CircuitEvent::Close { name } => {
                info!("Circuit breaker '{}' closed after successful recovery", name);
            },
            CircuitEvent::Success { .. }
            | CircuitEvent::Failure { .. }
            | CircuitEvent::Reject { .. } => {},
        }
    }
}

/// Wrap a bare function as an event handler.
///
/// ```rust,ignore
/// breaker.subscribe(handler_fn(|event| println!("{:?}", event)));
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn CircuitEventHandler>
where
    F: Fn(&CircuitEvent) + Send + Sync + 'static,
{
    struct FnHandler<F>(F);

    impl<F> CircuitEventHandler for FnHandler<F>
    where
        F: Fn(&CircuitEvent) + Send + Sync,
    {
        fn on_event(&self, event: &CircuitEvent) {
            (self.0)(event);
        }
    }

    Arc::new(FnHandler(f))
}
