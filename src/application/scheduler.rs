//! Periodic multi-asset driver.
//!
//! Assets run concurrently; each asset is serialized by its own
//! single-flight lock over [`EngineState`]. A tick that finds the lock held
//! skips that asset instead of queueing behind the running cycle.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::engine::DecisionEngine;
use super::state::EngineState;
use crate::domain::DecisionSnapshot;

/// Outcome of one scheduled slot for one asset.
#[derive(Debug, Clone)]
pub enum SlotOutcome {
    Decided(Box<DecisionSnapshot>),
    /// The previous cycle for this asset was still running.
    Skipped,
    /// Shutdown arrived while rates were being fetched.
    Cancelled,
}

/// Drives the engine over a fixed asset list on a fixed interval.
pub struct Scheduler {
    engine: Arc<DecisionEngine>,
    states: DashMap<String, Arc<Mutex<EngineState>>>,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler ticking every `interval`.
    #[must_use]
    pub fn new(engine: Arc<DecisionEngine>, interval: Duration) -> Self {
        Self {
            engine,
            states: DashMap::new(),
            interval,
        }
    }

    /// Engine shared by every asset.
    #[must_use]
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Lock handle for an asset's state, created on first use.
    fn state_for(&self, asset: &str) -> Arc<Mutex<EngineState>> {
        self.states
            .entry(asset.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(self.engine.new_state())))
            .clone()
    }

    /// Snapshot of an asset's state, if it has run.
    pub async fn state(&self, asset: &str) -> Option<EngineState> {
        let handle = self.states.get(asset).map(|entry| entry.value().clone())?;
        let state = handle.lock().await;
        Some(state.clone())
    }

    /// Run one cycle per asset concurrently.
    pub async fn run_once(
        &self,
        assets: &[String],
        shutdown: &watch::Receiver<bool>,
    ) -> Vec<(String, SlotOutcome)> {
        join_all(assets.iter().map(|asset| {
            let mut shutdown = shutdown.clone();
            async move {
                let outcome = self.run_slot(asset, &mut shutdown).await;
                (asset.clone(), outcome)
            }
        }))
        .await
    }

    async fn run_slot(&self, asset: &str, shutdown: &mut watch::Receiver<bool>) -> SlotOutcome {
        let handle = self.state_for(asset);
        let Ok(mut state) = handle.try_lock() else {
            warn!(asset, "Previous cycle still running, skipping");
            return SlotOutcome::Skipped;
        };

        let deadline = self.engine.cycle_deadline();
        let fetched = tokio::select! {
            fetched = self.engine.fetch_until(asset, deadline) => fetched,
            _ = wait_for_shutdown(shutdown) => {
                info!(asset, "Shutdown during rate fetch, cycle cancelled");
                return SlotOutcome::Cancelled;
            }
        };
        let Some(observations) = fetched else {
            let snapshot = self.engine.fetch_timed_out(asset).await;
            return SlotOutcome::Decided(Box::new(snapshot));
        };

        // Past this point a cycle runs to its audit write.
        let snapshot = self
            .engine
            .evaluate(asset, &mut state, &observations, deadline)
            .await;
        SlotOutcome::Decided(Box::new(snapshot))
    }

    /// Tick until shutdown. Every tick runs all assets in the background so
    /// a slow asset never delays the others.
    pub async fn run(self: Arc<Self>, assets: Vec<String>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = Vec::new();

        info!(
            assets = ?assets,
            interval_secs = self.interval.as_secs(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = wait_for_shutdown(&mut shutdown) => break,
            }

            in_flight.retain(|h: &tokio::task::JoinHandle<()>| !h.is_finished());
            for asset in &assets {
                let scheduler = Arc::clone(&self);
                let asset = asset.clone();
                let mut rx = shutdown.clone();
                in_flight.push(tokio::spawn(async move {
                    match scheduler.run_slot(&asset, &mut rx).await {
                        SlotOutcome::Decided(snapshot) => debug!(
                            asset = %asset,
                            outcome = snapshot.status.label(),
                            "Slot finished"
                        ),
                        SlotOutcome::Skipped | SlotOutcome::Cancelled => {}
                    }
                }));
            }
        }

        info!(running = in_flight.len(), "Scheduler stopping, draining cycles");
        for handle in in_flight {
            if let Err(e) = handle.await {
                warn!(error = %e, "Cycle task failed");
            }
        }
        info!("Scheduler stopped");
    }
}

/// Resolves once the shutdown flag is set or its sender is gone.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    if *rx.borrow() {
        return;
    }
    while rx.changed().await.is_ok() {
        if *rx.borrow() {
            return;
        }
    }
}
