//! Timer plumbing around [`ReminderRegistry::tick_all`].
//!
//! The registry never owns a timer. A [`Scheduler`] implementation decides
//! when to call back, and [`TickScheduler`] turns each callback into one
//! guarded reconciliation pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::cadence::Cadence;
use crate::clock::Clock;
use crate::registry::{SharedRegistry, TickSummary};

/// Callback fired by a [`Scheduler`].
pub type TickJob = Arc<dyn Fn() + Send + Sync>;

/// Host-provided timer: call `job` at every firing of `cadence`.
pub trait Scheduler {
    fn schedule(&self, cadence: Cadence, job: TickJob) -> JoinHandle<()>;
}

/// [`Scheduler`] backed by a tokio task. Stops when the shutdown flag flips to `true`.
pub struct TokioScheduler {
    clock: Arc<dyn Clock>,
    shutdown: watch::Receiver<bool>,
}

impl TokioScheduler {
    pub fn new(clock: Arc<dyn Clock>, shutdown: watch::Receiver<bool>) -> Self {
        Self { clock, shutdown }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, cadence: Cadence, job: TickJob) -> JoinHandle<()> {
        let clock = Arc::clone(&self.clock);
        let mut shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut interval = match cadence {
                Cadence::Every(period) => {
                    let mut interval =
                        tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    Some(interval)
                }
                Cadence::Midnight => None,
            };

            loop {
                let fire = async {
                    match interval.as_mut() {
                        Some(interval) => {
                            interval.tick().await;
                        }
                        None => {
                            let wait = cadence.wait_from(clock.now());
                            debug!(wait_secs = wait.as_secs(), "sleeping until midnight");
                            tokio::time::sleep(wait).await;
                        }
                    }
                };

                tokio::select! {
                    _ = fire => (*job)(),
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!("scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }
}

/// Runs reconciliation passes over a shared registry, never two at once.
#[derive(Clone)]
pub struct TickScheduler {
    registry: SharedRegistry,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag even if the tick panics.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TickScheduler {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one tick at the registry clock's "now".
    ///
    /// Returns `None` when another tick is still running; that tick is
    /// skipped, not queued.
    pub fn run_once(&self) -> Option<TickSummary> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            debug!("skipping tick: previous tick still running");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        let now = registry.now();
        let report = registry.tick_all(now);
        drop(registry);

        let summary = report.summary();
        for failure in &summary.failed {
            warn!(identity = %failure.identity, error = %failure.error.message, "tick failed for reminder");
        }
        info!(
            decayed = summary.decayed.len(),
            unchanged = summary.unchanged,
            failed = summary.failed.len(),
            "scheduled tick finished"
        );
        Some(summary)
    }

    /// Hand this tick driver to `scheduler` at the given cadence.
    pub fn start(self, scheduler: &dyn Scheduler, cadence: Cadence) -> JoinHandle<()> {
        info!(?cadence, "starting tick scheduler");
        scheduler.schedule(
            cadence,
            Arc::new(move || {
                self.run_once();
            }),
        )
    }
}
