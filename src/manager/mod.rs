//! Named registry of circuit breakers.
//!
//! The manager owns one breaker per guarded dependency, creates breakers on
//! demand, and aggregates their health for reporting endpoints. Registry
//! mutation is serialized by its own lock, independent of any individual
//! breaker's lock; breaker state is only ever mutated through the breaker's
//! own operations.
//!
//! The manager is an explicit value: construct one per process (or per test)
//! and pass it to whoever needs it. There is no hidden global.


use crate::breaker::{BreakerStatus, CircuitBreaker, CircuitBreakerConfig, CircuitState};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// In-memory registry of named circuit breakers.
#[derive(Default)]
pub struct CircuitBreakerManager {
    breakers: RwLock<HashMap<String, CircuitBreaker>>,
}

/// One breaker's line in the health overview.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSummary {
    pub name: String,
    pub state: CircuitState,
    /// Failure rate of the current window, percent.
    pub failure_rate: f64,
    /// Executed requests in the current window.
    pub window_requests: u64,
}

/// Aggregate view over every registered breaker.
#[derive(Debug, Clone, Serialize)]
pub struct HealthOverview {
    /// Registered breakers.
    pub total: usize,
    pub closed: usize,
    pub open: usize,
    pub half_open: usize,
    pub breakers: Vec<BreakerSummary>,
}

impl CircuitBreakerManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a breaker under `name` with the given configuration.
    ///
    /// Idempotent: if `name` is already registered the existing breaker is
    /// returned unchanged (with a warning logged) and `config` is discarded.
    pub fn create(&self, name: impl Into<String>, config: CircuitBreakerConfig) -> CircuitBreaker {
        let name = name.into();
        let mut breakers = self.breakers.write();
        if let Some(existing) = breakers.get(&name) {
            warn!(
                "Circuit breaker '{}' already registered, returning existing instance",
                name
            );
            return existing.clone();
        }
        info!("Registering circuit breaker '{}'", name);
        let breaker = CircuitBreaker::with_config(name.clone(), config);
        breakers.insert(name, breaker.clone());
        breaker
    }

    /// Look up a breaker by name.
    pub fn get(&self, name: &str) -> Option<CircuitBreaker> {
        self.breakers.read().get(name).cloned()
    }

    /// Return the breaker registered under `name`, creating it with `config`
    /// if absent.
    pub fn get_or_create(
        &self,
        name: impl Into<String>,
        config: CircuitBreakerConfig,
    ) -> CircuitBreaker {
        let name = name.into();
        if let Some(existing) = self.get(&name) {
            return existing;
        }
        // Double-checked under the write lock inside create(), so a racing
        // creator cannot register the same name twice.
        self.create(name, config)
    }

    /// Shut down and discard the named breaker. No-op if absent.
    pub fn remove(&self, name: &str) {
        let removed = self.breakers.write().remove(name);
        if let Some(breaker) = removed {
            breaker.shutdown();
            info!("Removed circuit breaker '{}'", name);
        }
    }

    /// All registered breakers, in no particular order.
    pub fn all(&self) -> Vec<CircuitBreaker> {
        self.breakers.read().values().cloned().collect()
    }

    /// Full status snapshot of every breaker, keyed by name.
    pub fn all_status(&self) -> HashMap<String, BreakerStatus> {
        self.breakers
            .read()
            .values()
            .map(|breaker| (breaker.name().to_string(), breaker.status()))
            .collect()
    }

    /// Aggregate current states across the registry.
    pub fn health_overview(&self) -> HealthOverview {
        let statuses: Vec<BreakerStatus> = self
            .breakers
            .read()
            .values()
            .map(CircuitBreaker::status)
            .collect();

        let mut overview = HealthOverview {
            total: statuses.len(),
            closed: 0,
            open: 0,
            half_open: 0,
            breakers: Vec::with_capacity(statuses.len()),
        };
        for status in statuses {
            match status.state {
                CircuitState::Closed => overview.closed += 1,
                CircuitState::Open => overview.open += 1,
                CircuitState::HalfOpen => overview.half_open += 1,
            }
            overview.breakers.push(BreakerSummary {
                name: status.name,
                state: status.state,
                failure_rate: status.failure_rate,
                window_requests: status.window.total,
            });
        }
        overview
    }

    /// Shut down every breaker and clear the registry.
    pub fn shutdown_all(&self) {
        let drained: Vec<CircuitBreaker> = {
            let mut breakers = self.breakers.write();
            breakers.drain().map(|(_, breaker)| breaker).collect()
        };
        for breaker in &drained {
            breaker.shutdown();
        }
        info!("Shut down {} circuit breakers", drained.len());
    }

    /// Number of registered breakers.
    pub fn len(&self) -> usize {
        self.breakers.read().len()
    }

    /// True if no breakers are registered.
    pub fn is_empty(&self) -> bool {
        self.breakers.read().is_empty()
    }
}
