use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive transport failures before opening.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Time the circuit stays open before a probe is let through (seconds).
    #[serde(default = "default_open_duration_secs")]
    pub open_duration_secs: u64,
    /// Successes required in half-open before closing.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_open_duration_secs() -> u64 {
    30
}

const fn default_success_threshold() -> u32 {
    2
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            open_duration_secs: default_open_duration_secs(),
            success_threshold: default_success_threshold(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        })
    }
}

/// Circuit breaker with Closed/Open/HalfOpen states, one per ledger operation.
pub struct CircuitBreaker {
    name: &'static str,
    cfg: CircuitBreakerConfig,
    state: parking_lot::Mutex<State>,
}

#[derive(Debug)]
enum State {
    Closed { failures: u32 },
    Open { until: Instant },
    HalfOpen { successes: u32 },
}

impl CircuitBreaker {
    pub fn new(name: &'static str, cfg: CircuitBreakerConfig) -> Self {
        Self { name, cfg, state: parking_lot::Mutex::new(State::Closed { failures: 0 }) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> BreakerState {
        match *self.state.lock() {
            State::Closed { .. } => BreakerState::Closed,
            State::Open { until } if Instant::now() >= until => BreakerState::HalfOpen,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen { .. } => BreakerState::HalfOpen,
        }
    }

    pub fn allow(&self) -> bool {
        let now = Instant::now();
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { .. } | State::HalfOpen { .. } => true,
            State::Open { until } if now < until => {
                debug!(
                    "circuit breaker open; denying call breaker={} open_for_ms={}",
                    self.name,
                    until.saturating_duration_since(now).as_millis()
                );
                false
            }
            State::Open { .. } => {
                info!("circuit breaker transitioning open->half_open breaker={}", self.name);
                *guard = State::HalfOpen { successes: 0 };
                true
            }
        }
    }

    pub fn record_success(&self) {
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { failures } => {
                if failures > 0 {
                    debug!("circuit breaker success; resetting breaker={} failures={}", self.name, failures);
                }
                *guard = State::Closed { failures: 0 };
            }
            State::HalfOpen { successes } => {
                let next = successes.saturating_add(1);
                if next >= self.cfg.success_threshold.max(1) {
                    info!("circuit breaker transitioning half_open->closed breaker={} successes={}", self.name, next);
                    *guard = State::Closed { failures: 0 };
                } else {
                    *guard = State::HalfOpen { successes: next };
                }
            }
            State::Open { .. } => {}
        }
    }

    pub fn record_failure(&self) {
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { failures } => {
                let next = failures.saturating_add(1);
                if next >= self.cfg.failure_threshold.max(1) {
                    warn!(
                        "circuit breaker opened breaker={} failures={} open_for_secs={}",
                        self.name, next, self.cfg.open_duration_secs
                    );
                    *guard = State::Open { until: self.open_until() };
                } else {
                    debug!("circuit breaker recorded failure breaker={} failures={} threshold={}", self.name, next, self.cfg.failure_threshold);
                    *guard = State::Closed { failures: next };
                }
            }
            State::HalfOpen { .. } => {
                warn!("circuit breaker re-opened from half-open breaker={} open_for_secs={}", self.name, self.cfg.open_duration_secs);
                *guard = State::Open { until: self.open_until() };
            }
            State::Open { .. } => {}
        }
    }

    fn open_until(&self) -> Instant {
        Instant::now() + Duration::from_secs(self.cfg.open_duration_secs.max(1))
    }
}
