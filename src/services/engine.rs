// src/services/engine.rs

//! Discovery engine and continuous search controller.
//!
//! `DiscoveryEngine` owns the visited set and the cancellation flag. It runs
//! single discovery calls and the continuous loop, which repeats calls until
//! it is stopped, a round comes back empty, or the consumer goes away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{AppError, Result};
use crate::models::{Config, Prospect, SearchFilters};
use crate::services::analyzer::Analyzer;
use crate::services::dedup::VisitedSet;
use crate::services::orchestrator::{DiscoveryOrchestrator, DiscoveryOutcome};
use crate::services::search::SearchProvider;

/// Lifecycle of the continuous loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Stopped,
}

/// Why the continuous loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `stop_continuous` was called.
    Cancelled,
    /// A round produced no new prospects.
    Exhausted,
    /// The sink reported that nobody is receiving batches anymore.
    ConsumerClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuousSummary {
    pub rounds: usize,
    pub delivered: usize,
    pub reason: StopReason,
}

/// Receives each round's batch before the next round starts.
#[async_trait]
pub trait BatchSink: Send {
    /// Hand over one batch. `Ok(false)` means the consumer is gone.
    async fn deliver(&mut self, batch: Vec<Prospect>) -> Result<bool>;
}

#[async_trait]
impl BatchSink for mpsc::Sender<Vec<Prospect>> {
    async fn deliver(&mut self, batch: Vec<Prospect>) -> Result<bool> {
        Ok(self.send(batch).await.is_ok())
    }
}

/// Cloneable handle that requests a stop from another task.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Discovery entry point.
pub struct DiscoveryEngine {
    orchestrator: DiscoveryOrchestrator,
    visited: Arc<VisitedSet>,
    cancel: Arc<AtomicBool>,
    state: Mutex<ControllerState>,
    pace: Duration,
}

impl DiscoveryEngine {
    pub fn new(
        config: &Config,
        provider: Arc<dyn SearchProvider>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        let visited = Arc::new(VisitedSet::new());
        Self {
            orchestrator: DiscoveryOrchestrator::new(
                config,
                provider,
                analyzer,
                Arc::clone(&visited),
            ),
            visited,
            cancel: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(ControllerState::Idle),
            pace: Duration::from_millis(config.discovery.pace_ms),
        }
    }

    /// One discovery call.
    pub async fn run_once(&self, filters: &SearchFilters) -> Vec<Prospect> {
        self.orchestrator.run(filters).await
    }

    pub async fn run_once_detailed(&self, filters: &SearchFilters) -> DiscoveryOutcome {
        self.orchestrator.run_detailed(filters).await
    }

    /// Configured delay between continuous rounds.
    pub fn default_pace(&self) -> Duration {
        self.pace
    }

    /// Run discovery rounds until stopped.
    ///
    /// Each round calls `quota_hook` once, runs one discovery call and awaits
    /// `sink.deliver` before pausing for `pace`. A pending stop request is
    /// cleared on entry. Returns `AlreadyRunning` if a loop is active on this
    /// engine, and the sink's error if delivery fails.
    pub async fn start_continuous<S, Q>(
        &self,
        filters: &SearchFilters,
        sink: &mut S,
        pace: Duration,
        mut quota_hook: Q,
    ) -> Result<ContinuousSummary>
    where
        S: BatchSink + ?Sized,
        Q: FnMut() + Send,
    {
        let _running = RunningGuard::enter(self)?;
        self.cancel.store(false, Ordering::SeqCst);
        log::info!(
            "Continuous search started (sector={}, region={}, age={})",
            filters.sector,
            filters.region,
            filters.website_age
        );

        let mut rounds = 0;
        let mut delivered = 0;
        let reason = loop {
            if self.is_cancelled() {
                break StopReason::Cancelled;
            }

            quota_hook();
            let batch = self.orchestrator.run(filters).await;
            rounds += 1;

            if batch.is_empty() {
                log::info!("Round {}: no new prospects", rounds);
                break StopReason::Exhausted;
            }

            let count = batch.len();
            if !sink.deliver(batch).await? {
                log::warn!("Batch consumer closed after round {}", rounds);
                break StopReason::ConsumerClosed;
            }
            delivered += count;
            log::info!("Round {}: delivered {} prospects ({} total)", rounds, count, delivered);

            if self.is_cancelled() {
                break StopReason::Cancelled;
            }
            tokio::time::sleep(pace).await;
        };

        log::info!("Continuous search stopped: {:?} after {} rounds", reason, rounds);
        Ok(ContinuousSummary {
            rounds,
            delivered,
            reason,
        })
    }

    /// Request a stop. The current round finishes and delivers first.
    pub fn stop_continuous(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.cancel))
    }

    pub fn state(&self) -> ControllerState {
        *self.lock_state()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Forget visited sites so they can be rediscovered.
    pub fn reset_visited(&self) {
        self.visited.clear();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Marks the engine running for the lifetime of one continuous loop.
struct RunningGuard<'a> {
    engine: &'a DiscoveryEngine,
}

impl<'a> RunningGuard<'a> {
    fn enter(engine: &'a DiscoveryEngine) -> Result<Self> {
        let mut state = engine.lock_state();
        if *state == ControllerState::Running {
            return Err(AppError::AlreadyRunning);
        }
        *state = ControllerState::Running;
        Ok(Self { engine })
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.engine.lock_state() = ControllerState::Stopped;
    }
}
