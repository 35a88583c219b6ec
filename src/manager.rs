//! Liked tracks manager
//!
//! The manager owns the only write path into the [`TrackCache`] and exposes
//! the read-only query surface over it.
//!
//! # Loading strategy
//!
//! - [`initialize`](LikedTracksManager::initialize) loads one page so callers
//!   get a usable cache quickly, arms the poll scheduler and (optionally)
//!   continues with a background backfill.
//! - [`load_all_data`](LikedTracksManager::load_all_data) sweeps the remaining
//!   pages, resuming from the number of tracks already held.
//! - [`update_incremental`](LikedTracksManager::update_incremental) compares
//!   the head page against the cache and picks between no-op, head-diff,
//!   backfill and full reload.
//! - [`reload_all`](LikedTracksManager::reload_all) rebuilds the cache from
//!   scratch off to the side and publishes it in one swap.
//!
//! # Concurrency
//!
//! Every load, backfill, reload and update runs under a single syncing flag.
//! An operation that finds the flag taken returns immediately without error;
//! overlapping triggers never queue or interleave. The flag is released by a
//! drop guard, so every exit path (including `?` and panics) clears it.
//! Queries never touch the flag.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheGeneration, TrackCache};
use crate::config::{Config, SyncConfig};
use crate::error::SyncError;
use crate::models::{CacheStats, Track};
use crate::notify::{Notifier, NotifyLevel, TracingNotifier};
use crate::source::TrackSource;
use crate::sync::{Debouncer, PageFetcher, PollScheduler, PollTarget, RetryManager, TriggerHandle};

/// What an incremental update ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Another sync operation was running; nothing was done
    Busy,
    /// The remote total matched the cache; nothing was changed
    Unchanged,
    /// Head-diff inserted these previously unseen uris
    Added(Vec<String>),
    /// Growth exceeded one page; a backfill ran instead of a diff
    Backfilled,
    /// The remote collection shrank, or a bulk backfill left gaps; the
    /// cache was rebuilt
    Reloaded,
    /// The update failed and was logged
    Failed,
}

/// Holds the syncing flag for the lifetime of one operation
struct SyncGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct ManagerInner {
    config: SyncConfig,
    fetcher: PageFetcher,
    cache: TrackCache,
    syncing: AtomicBool,
    scheduler: PollScheduler,
    debouncer: Debouncer,
    notifier: Arc<dyn Notifier>,
}

/// Mirror of a remote liked-tracks collection
///
/// Cheap to clone; clones share the same cache and scheduler.
#[derive(Clone)]
pub struct LikedTracksManager {
    inner: Arc<ManagerInner>,
}

impl LikedTracksManager {
    /// Create a manager that reports notifications to the log
    pub fn new(source: Arc<dyn TrackSource>, config: &Config) -> Self {
        Self::with_notifier(source, config, Arc::new(TracingNotifier))
    }

    /// Create a manager with a custom notification sink
    pub fn with_notifier(
        source: Arc<dyn TrackSource>,
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let sync = config.sync.clone();
        let fetcher = PageFetcher::new(
            source,
            RetryManager::new(config.retry.clone()),
            sync.max_page_size,
        );

        Self {
            inner: Arc::new(ManagerInner {
                scheduler: PollScheduler::new(sync.poll_interval()),
                debouncer: Debouncer::new(sync.debounce_interval()),
                config: sync,
                fetcher,
                cache: TrackCache::new(),
                syncing: AtomicBool::new(false),
                notifier,
            }),
        }
    }

    /// Bootstrap the cache with the first page and arm the scheduler
    ///
    /// Returns immediately if another load is running or the cache already
    /// holds tracks. Fails with [`SyncError::SourceUnavailable`] if the source
    /// cannot be reached, or with the fetch error once retries are exhausted;
    /// in both cases the cache is left untouched and the scheduler unarmed.
    pub async fn initialize(&self) -> Result<(), SyncError> {
        let inner = &self.inner;

        let Some(guard) = SyncGuard::acquire(&inner.syncing) else {
            debug!("Load already in progress, skipping initialize");
            return Ok(());
        };

        if !inner.cache.is_empty() {
            debug!(loaded = inner.cache.len(), "Cache already initialized");
            return Ok(());
        }

        info!(source = inner.fetcher.source().name(), "Initializing liked tracks cache");

        if !inner.fetcher.source().is_available().await {
            let err = SyncError::SourceUnavailable(inner.fetcher.source().name().to_string());
            error!(error = %err, "Initialization failed");
            inner.notify_failure(&err);
            return Err(err);
        }

        let generation = inner.cache.current();
        if let Err(e) = inner.load_first_page(&generation).await {
            error!(error = %e, "Initialization failed");
            inner.notify_failure(&e);
            return Err(e);
        }

        self.start_polling();

        let stats = generation.stats();
        info!(
            loaded = stats.loaded,
            total = stats.total,
            "Initialization complete"
        );
        inner.notify(
            NotifyLevel::Success,
            &format!("Liked tracks loaded ({})", stats.total),
        );

        drop(guard);

        if inner.config.backfill_on_start && (stats.loaded as u64) < stats.total {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                if let Err(e) = inner.load_all_data().await {
                    warn!(error = %e, "Background backfill failed");
                    inner.notify(
                        NotifyLevel::Warn,
                        &format!("Liked tracks only partially loaded: {}", e),
                    );
                }
            });
        }

        Ok(())
    }

    /// Fetch every page not yet held
    pub async fn load_all_data(&self) -> Result<(), SyncError> {
        self.inner.load_all_data().await
    }

    /// Discard the cache and rebuild it from the first page onwards
    pub async fn reload_all(&self) -> Result<(), SyncError> {
        self.inner.reload_all().await
    }

    /// Compare the head page with the cache and reconcile
    ///
    /// Failures are logged and reported as [`UpdateOutcome::Failed`], never
    /// returned as errors.
    ///
    /// The head-diff relies on the source listing the most recently liked
    /// tracks first. New tracks that land outside the first page are not
    /// seen until the next backfill or reload. Growth of more than a page
    /// runs a backfill, and falls back to a full reload if the cache is
    /// still short of the reported total afterwards.
    pub async fn update_incremental(&self) -> UpdateOutcome {
        self.inner.update_incremental().await
    }

    /// Debounced [`update_incremental`](Self::update_incremental)
    ///
    /// Returns `None` if the check was dropped because the previous accepted
    /// check was too recent.
    pub async fn check_for_updates(&self) -> Option<UpdateOutcome> {
        self.inner.check_for_updates().await
    }

    /// Arm the recurring incremental update; no-op if already armed
    pub fn start_polling(&self) -> bool {
        let weak = Arc::downgrade(&self.inner);
        let target: Weak<dyn PollTarget> = weak;
        self.inner.scheduler.start(target)
    }

    /// Disarm the recurring incremental update
    pub fn stop_polling(&self) -> bool {
        self.inner.scheduler.stop()
    }

    /// Whether the recurring update is armed
    pub fn is_polling(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    /// Handle for event sources that want to request a (debounced) check
    pub fn trigger_handle(&self) -> TriggerHandle {
        self.inner.scheduler.trigger_handle()
    }

    /// Whether a sync operation is currently running
    pub fn is_syncing(&self) -> bool {
        self.inner.syncing.load(Ordering::Acquire)
    }

    /// Whether the track is liked, as far as the cache knows
    pub fn is_member(&self, uri: &str) -> bool {
        self.inner.cache.contains(uri)
    }

    /// Cached track for this uri
    pub fn get(&self, uri: &str) -> Option<Track> {
        self.inner.cache.get(uri)
    }

    /// Cache metadata snapshot
    pub fn get_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }
}

impl ManagerInner {
    /// Forward to the notifier; `quiet` drops everything but errors
    fn notify(&self, level: NotifyLevel, message: &str) {
        if self.config.quiet && level != NotifyLevel::Error {
            return;
        }
        self.notifier.notify(level, message);
    }

    fn notify_failure(&self, err: &SyncError) {
        self.notify(
            NotifyLevel::Error,
            &format!("Failed to load liked tracks: {}", err),
        );
    }

    async fn load_all_data(&self) -> Result<(), SyncError> {
        let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
            warn!("Sync in progress, skipping backfill");
            return Ok(());
        };

        self.backfill(&self.cache.current()).await
    }

    async fn reload_all(&self) -> Result<(), SyncError> {
        let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
            warn!("Sync in progress, skipping reload");
            return Ok(());
        };

        self.reload().await
    }

    async fn update_incremental(&self) -> UpdateOutcome {
        let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
            debug!("Sync in progress, skipping incremental update");
            return UpdateOutcome::Busy;
        };

        match self.incremental().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Incremental update failed");
                UpdateOutcome::Failed
            }
        }
    }

    async fn check_for_updates(&self) -> Option<UpdateOutcome> {
        if !self.debouncer.try_accept() {
            debug!(
                min_interval_ms = self.debouncer.min_interval().as_millis() as u64,
                "Update check debounced"
            );
            return None;
        }
        Some(self.update_incremental().await)
    }

    /// Fetch page 0 into `generation`
    async fn load_first_page(&self, generation: &CacheGeneration) -> Result<(), SyncError> {
        let page = self.fetcher.fetch(0, self.config.default_page_size).await?;
        let returned = page.len();

        generation.merge(page.items);
        generation.set_total(page.total);
        generation.touch();

        debug!(returned, total = page.total, "First page loaded");
        Ok(())
    }

    /// Sweep pages from the current size of `generation` up to its total
    async fn backfill(&self, generation: &CacheGeneration) -> Result<(), SyncError> {
        let total = generation.total();
        let mut offset = generation.len();

        if offset as u64 >= total {
            generation.set_fully_loaded(true);
            debug!(loaded = offset, total, "Nothing to backfill");
            return Ok(());
        }

        info!(offset, total, "Starting backfill");
        let page_size = self.config.default_page_size;

        loop {
            let page = self.fetcher.fetch(offset, page_size).await?;
            if page.is_empty() {
                warn!(
                    offset,
                    total, "Source returned an empty page before the reported total"
                );
                break;
            }

            offset += page.len();
            generation.merge(page.items);
            debug!(offset, total, "Backfill progress");

            if offset as u64 >= total {
                break;
            }
            tokio::time::sleep(self.config.backfill_delay()).await;
        }

        let loaded = generation.len();
        generation.set_fully_loaded(loaded as u64 >= total);
        generation.touch();
        info!(loaded, total, "Backfill complete");
        Ok(())
    }

    /// Build a complete new generation, then publish it
    ///
    /// Readers keep seeing the previous generation until the rebuild
    /// succeeds; on failure the staged generation is dropped.
    async fn reload(&self) -> Result<(), SyncError> {
        info!("Reloading liked tracks cache");
        let staged = self.cache.stage();

        self.load_first_page(&staged).await?;
        self.backfill(&staged).await?;

        let stats = staged.stats();
        self.cache.publish(staged);
        info!(loaded = stats.loaded, total = stats.total, "Reload complete");
        Ok(())
    }

    async fn incremental(&self) -> Result<UpdateOutcome, SyncError> {
        let generation = self.cache.current();
        let page_size = self.config.default_page_size;
        let page = self.fetcher.fetch(0, page_size).await?;
        let previous = generation.total();

        match page.total.cmp(&previous) {
            CmpOrdering::Equal => {
                debug!(total = previous, "No change in liked tracks");
                Ok(UpdateOutcome::Unchanged)
            }
            CmpOrdering::Less => {
                info!(
                    previous,
                    current = page.total,
                    "Liked tracks removed remotely, reloading"
                );
                self.reload().await?;
                Ok(UpdateOutcome::Reloaded)
            }
            CmpOrdering::Greater if page.total - previous > page_size as u64 => {
                info!(
                    previous,
                    current = page.total,
                    "Bulk change detected, running backfill"
                );
                generation.merge(page.items);
                generation.set_total(page.total);
                generation.set_fully_loaded(false);
                self.backfill(&generation).await?;

                if generation.is_fully_loaded() {
                    return Ok(UpdateOutcome::Backfilled);
                }
                // The sweep resumes past the cached count and cannot reach
                // items that landed between the head page and that offset
                info!(
                    loaded = generation.len(),
                    total = page.total,
                    "Backfill left gaps, reloading"
                );
                self.reload().await?;
                Ok(UpdateOutcome::Reloaded)
            }
            CmpOrdering::Greater => {
                let added = generation.insert_missing(page.items);
                let covered = generation.len() as u64 >= page.total;
                generation.set_total(page.total);
                generation.set_fully_loaded(generation.is_fully_loaded() && covered);
                generation.touch();

                info!(
                    previous,
                    current = page.total,
                    added = added.len(),
                    "Incremental update applied"
                );
                for uri in &added {
                    debug!(uri = %uri, "New liked track");
                }
                Ok(UpdateOutcome::Added(added))
            }
        }
    }
}

#[async_trait]
impl PollTarget for ManagerInner {
    async fn on_tick(&self) {
        let outcome = self.update_incremental().await;
        debug!(outcome = ?outcome, "Scheduled update finished");
    }

    async fn on_trigger(&self) {
        if let Some(outcome) = self.check_for_updates().await {
            debug!(outcome = ?outcome, "Triggered update finished");
        }
    }
}
