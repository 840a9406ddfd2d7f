//! Mock effects implementation for recovery testing
//!
//! [`MockEffects`] implements every effect trait the recovery core consumes with
//! deterministic, scriptable behavior:
//! - Deterministic randomness using seeded ChaCha20 RNG
//! - Controllable time; `sleep_ms` advances the clock instead of waiting
//! - A transaction executor that records every submission, fails on demand,
//!   and can be stalled to observe in-flight state
//!
//! # Blocking Lock Usage
//!
//! Uses `std::sync::Mutex` because this is test infrastructure where lock
//! contention is not a concern and locks are never held across awaits.

use async_trait::async_trait;
use keeper_core::effects::{
    ExecutionError, Operation, PhysicalTimeEffects, RandomEffects, TimeError, TransactionExecutor,
};
use keeper_core::PhysicalTime;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Mock effects implementation for deterministic testing
///
/// Clones share state, so a test can keep a handle while the service owns
/// another.
#[derive(Debug, Clone)]
pub struct MockEffects {
    state: Arc<Mutex<MockState>>,
    stall: Arc<watch::Sender<bool>>,
}

#[derive(Debug)]
struct MockState {
    /// Deterministic RNG for reproducible tests
    rng: ChaCha20Rng,
    /// Physical time counter (deterministic)
    physical_time_ms: u64,
    /// Every operation handed to the executor, in order
    submitted: Vec<Operation>,
    /// Operations the executor confirmed
    confirmed: Vec<Operation>,
    /// One-shot failures consumed by the next executions
    queued_failures: VecDeque<ExecutionError>,
    /// Persistent failures keyed by descriptor name
    failing_operations: HashMap<&'static str, ExecutionError>,
}

impl MockEffects {
    /// Fixed start time: 2022-01-01 00:00:00 UTC
    pub const START_TIME_MS: u64 = 1_640_995_200_000;

    /// Create deterministic mock effects with fixed seed
    pub fn deterministic() -> Self {
        Self::with_seed([42; 32])
    }

    /// Create mock effects with specific seed for reproducible tests
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let (stall, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(MockState {
                rng: ChaCha20Rng::from_seed(seed),
                physical_time_ms: Self::START_TIME_MS,
                submitted: Vec::new(),
                confirmed: Vec::new(),
                queued_failures: VecDeque::new(),
                failing_operations: HashMap::new(),
            })),
            stall: Arc::new(stall),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.state.lock().unwrap().physical_time_ms
    }

    pub fn set_time(&self, ts_ms: u64) {
        self.state.lock().unwrap().physical_time_ms = ts_ms;
    }

    pub fn advance_time(&self, ms: u64) {
        self.state.lock().unwrap().physical_time_ms += ms;
    }

    /// Fail the next execution with `error`. Calls queue up.
    pub fn fail_next(&self, error: ExecutionError) {
        self.state.lock().unwrap().queued_failures.push_back(error);
    }

    /// Fail every execution of the named operation (e.g. `"approve_recovery"`).
    pub fn fail_operation(&self, name: &'static str, error: ExecutionError) {
        self.state
            .lock()
            .unwrap()
            .failing_operations
            .insert(name, error);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.queued_failures.clear();
        state.failing_operations.clear();
    }

    /// Hold every execution, current and future, until [`Self::resume_executions`].
    pub fn stall_executions(&self) {
        self.stall.send_replace(true);
    }

    pub fn resume_executions(&self) {
        self.stall.send_replace(false);
    }

    /// Operations submitted so far, confirmed or not.
    pub fn submitted(&self) -> Vec<Operation> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// Descriptor names of submitted operations.
    pub fn submitted_names(&self) -> Vec<&'static str> {
        self.state
            .lock()
            .unwrap()
            .submitted
            .iter()
            .map(Operation::name)
            .collect()
    }

    /// Operations the executor reported as successful.
    pub fn confirmed(&self) -> Vec<Operation> {
        self.state.lock().unwrap().confirmed.clone()
    }
}

impl Default for MockEffects {
    fn default() -> Self {
        Self::deterministic()
    }
}

#[async_trait]
impl TransactionExecutor for MockEffects {
    async fn execute(&self, operation: &Operation) -> Result<(), ExecutionError> {
        self.state.lock().unwrap().submitted.push(operation.clone());

        let mut stall = self.stall.subscribe();
        let resumed = stall.wait_for(|stalled| !*stalled).await.is_ok();
        if !resumed {
            return Err(ExecutionError::Cancelled);
        }

        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.queued_failures.pop_front() {
            return Err(error);
        }
        if let Some(error) = state.failing_operations.get(operation.name()) {
            return Err(error.clone());
        }
        state.confirmed.push(operation.clone());
        Ok(())
    }
}

#[async_trait]
impl PhysicalTimeEffects for MockEffects {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        Ok(PhysicalTime::from_ms(self.now_ms()))
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        self.advance_time(ms);
        tokio::task::yield_now().await;
        Ok(())
    }
}

#[async_trait]
impl RandomEffects for MockEffects {
    async fn random_bytes_16(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        self.state.lock().unwrap().rng.fill_bytes(&mut bytes);
        bytes
    }
}
