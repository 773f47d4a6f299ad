// ABOUTME: Circuit breaker tracking the health of a notification backend
// ABOUTME: An open circuit marks the backend structurally unreachable until a recovery trial
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use slotwise_core::constants::channels::{
    DEFAULT_PUSH_FAILURE_THRESHOLD, DEFAULT_PUSH_RECOVERY_SECS,
};
use slotwise_core::errors::ChannelError;
use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Backend healthy, sends pass through
    Closed,
    /// Backend considered down, sends are refused without a network call
    Open,
    /// One trial send is in flight to test recovery
    HalfOpen,
}

impl CircuitState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Closed,
            1 => Self::Open,
            _ => Self::HalfOpen,
        }
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }
}

/// Thresholds for opening and closing the circuit
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive backend failures before the circuit opens
    pub failure_threshold: u32,
    /// Time an open circuit waits before allowing a trial send
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_PUSH_FAILURE_THRESHOLD,
            recovery_timeout: Duration::from_secs(DEFAULT_PUSH_RECOVERY_SECS),
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration
    #[must_use]
    pub const fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
        }
    }
}

enum Admission {
    Pass,
    Trial,
    Refused,
}

/// Reopens the circuit if a half-open trial is dropped before it completes
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl TrialGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(backend = %self.breaker.backend, "Recovery trial cancelled before completing");
        self.breaker.record_failure();
    }
}

/// Lock-free circuit breaker for one backend
///
/// Only failures that say something about backend health (outages and
/// timeouts) are counted; a rejected payload leaves the circuit alone.
pub struct CircuitBreaker {
    backend: String,
    state: AtomicU8,
    consecutive_failures: AtomicU32,
    opened_at_ms: AtomicU64,
    config: CircuitBreakerConfig,
    epoch: Instant,
}

impl CircuitBreaker {
    /// Create a breaker with default thresholds
    #[must_use]
    pub fn new(backend: &str) -> Self {
        Self::with_config(backend, CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom thresholds
    #[must_use]
    pub fn with_config(backend: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            backend: backend.to_owned(),
            state: AtomicU8::new(CircuitState::Closed.to_u8()),
            consecutive_failures: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
            config,
            epoch: Instant::now(),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Consecutive counted failures
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    /// Whether the backend must be treated as unreachable right now
    ///
    /// Does not change state; an open circuit whose recovery timeout elapsed
    /// reports reachable so the next send can act as the trial.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open && !self.recovery_elapsed()
    }

    fn recovery_elapsed(&self) -> bool {
        let opened_at = self.opened_at_ms.load(Ordering::SeqCst);
        let recovery_ms = self.config.recovery_timeout.as_millis() as u64;
        self.elapsed_ms().saturating_sub(opened_at) >= recovery_ms
    }

    fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Admit a send, moving an expired open circuit to half-open
    fn admit(&self) -> Admission {
        match self.state() {
            CircuitState::Closed => Admission::Pass,
            CircuitState::HalfOpen => Admission::Refused,
            CircuitState::Open => {
                let claimed = self.recovery_elapsed()
                    && self
                        .state
                        .compare_exchange(
                            CircuitState::Open.to_u8(),
                            CircuitState::HalfOpen.to_u8(),
                            Ordering::SeqCst,
                            Ordering::SeqCst,
                        )
                        .is_ok();
                if claimed {
                    Admission::Trial
                } else {
                    Admission::Refused
                }
            }
        }
    }

    /// Record a send that reached the backend
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        let previous = self
            .state
            .swap(CircuitState::Closed.to_u8(), Ordering::SeqCst);
        if CircuitState::from_u8(previous) != CircuitState::Closed {
            info!(backend = %self.backend, "Circuit closed - backend recovered");
        }
    }

    /// Record a backend outage or timeout
    pub fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        let trip = match self.state() {
            CircuitState::Closed => failures >= self.config.failure_threshold,
            CircuitState::HalfOpen | CircuitState::Open => true,
        };
        if trip {
            self.opened_at_ms.store(self.elapsed_ms(), Ordering::SeqCst);
            let previous = self.state.swap(CircuitState::Open.to_u8(), Ordering::SeqCst);
            if CircuitState::from_u8(previous) != CircuitState::Open {
                warn!(
                    backend = %self.backend,
                    failures,
                    threshold = self.config.failure_threshold,
                    recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
                    "Circuit opened - backend treated as unreachable"
                );
            }
        }
    }

    /// Run `operation` under the breaker
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unreachable` without running `operation` while the
    /// circuit is open, otherwise the operation's own error
    pub async fn call<F, T>(&self, operation: F) -> Result<T, ChannelError>
    where
        F: Future<Output = Result<T, ChannelError>>,
    {
        let trial = match self.admit() {
            Admission::Refused => {
                return Err(ChannelError::unreachable(
                    &self.backend,
                    "circuit open after repeated backend failures",
                ))
            }
            Admission::Trial => Some(TrialGuard {
                breaker: self,
                armed: true,
            }),
            Admission::Pass => None,
        };

        let result = operation.await;
        if let Some(guard) = trial {
            guard.disarm();
        }
        match &result {
            Ok(_) => self.record_success(),
            Err(e) if e.counts_against_backend() => self.record_failure(),
            // Reached the backend; a rejected payload proves it is alive
            Err(_) => self.record_success(),
        }
        result
    }

    /// Force the circuit closed
    pub fn reset(&self) {
        self.state
            .store(CircuitState::Closed.to_u8(), Ordering::SeqCst);
        self.consecutive_failures.store(0, Ordering::SeqCst);
        info!(backend = %self.backend, "Circuit manually reset to closed state");
    }
}
