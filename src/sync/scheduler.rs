//! Poll scheduler for periodic freshness checks
//!
//! This module provides a single recurring timer that drives incremental
//! updates, plus a [`TriggerHandle`] through which external event sources can
//! request an out-of-band check. The scheduler does not know what a tick does;
//! it only calls into a [`PollTarget`].

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Work performed by the scheduler
#[async_trait]
pub trait PollTarget: Send + Sync {
    /// Called on every timer tick
    async fn on_tick(&self);

    /// Called when a [`TriggerHandle`] was notified
    async fn on_trigger(&self);
}

/// Cloneable handle for requesting an out-of-band check
///
/// Notifications are coalesced: many `notify()` calls before the scheduler
/// gets to them result in a single `on_trigger`.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    notify: Arc<Notify>,
}

impl TriggerHandle {
    /// Request a check
    pub fn notify(&self) {
        self.notify.notify_one();
    }
}

struct RunningTask {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Recurring timer with duplicate-arming protection
pub struct PollScheduler {
    interval: Duration,
    trigger: Arc<Notify>,
    running: Mutex<Option<RunningTask>>,
}

impl PollScheduler {
    /// Create a stopped scheduler ticking every `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            trigger: Arc::new(Notify::new()),
            running: Mutex::new(None),
        }
    }

    /// Handle for external trigger sources
    pub fn trigger_handle(&self) -> TriggerHandle {
        TriggerHandle {
            notify: Arc::clone(&self.trigger),
        }
    }

    /// Tick interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the timer is armed
    ///
    /// A task that exited on its own (its target was dropped) no longer
    /// counts as armed.
    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Arm the timer
    ///
    /// Returns `false` without doing anything if already armed. The task
    /// holds only a weak reference to `target` and exits once it is dropped.
    pub fn start(&self, target: Weak<dyn PollTarget>) -> bool {
        let mut running = self.lock_running();
        if running
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
        {
            debug!("Poll scheduler already running");
            return false;
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let first_tick = Instant::now() + self.interval;
        let handle = tokio::spawn(Self::run(
            first_tick,
            self.interval,
            Arc::clone(&self.trigger),
            target,
            shutdown_rx,
        ));

        info!(
            interval_secs = self.interval.as_secs(),
            "Poll scheduler started"
        );
        *running = Some(RunningTask {
            shutdown_tx,
            handle,
        });
        true
    }

    /// Disarm the timer
    ///
    /// Returns `false` if it was not armed. A tick already in progress runs
    /// to completion; no further ticks fire.
    pub fn stop(&self) -> bool {
        let task = self.lock_running().take();
        match task {
            Some(task) if !task.handle.is_finished() => {
                let _ = task.shutdown_tx.send(());
                drop(task.handle);
                info!("Poll scheduler stopped");
                true
            }
            _ => false,
        }
    }

    async fn run(
        first_tick: Instant,
        interval: Duration,
        trigger: Arc<Notify>,
        target: Weak<dyn PollTarget>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let mut ticker = interval_at(first_tick, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!("Poll task shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        debug!("Poll target dropped, stopping");
                        break;
                    };
                    debug!("Scheduled poll tick");
                    target.on_tick().await;
                }
                _ = trigger.notified() => {
                    let Some(target) = target.upgrade() else { break };
                    debug!("External trigger received");
                    target.on_trigger().await;
                }
            }
        }
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<RunningTask>> {
        match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.lock_running().take() {
            let _ = task.shutdown_tx.send(());
        }
    }
}
