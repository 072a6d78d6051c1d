//! Sync controller: fetch, diff, resolve, persist.
//!
//! The controller owns the live [`QuoteBook`] and is the only writer of the
//! quote store. Two entry points share one phase:
//!
//! - automatic sync: `Idle -> Fetching -> Applying -> Idle`, server wins
//! - manual sync: `Idle -> Fetching -> AwaitingResolution -> Idle`, the
//!   caller decides with [`SyncController::resolve`]
//!
//! A sync started while the phase is not `Idle` fails with
//! [`SyncError::SyncInProgress`]; timer ticks treat that as a skipped tick.
//! Fetch failures return to `Idle` and leave local state untouched, and so
//! does a sync future dropped before it finishes.

use crate::book::QuoteBook;
use crate::config::SyncConfig;
use crate::diff::{DiffResult, diff};
use crate::error::{SyncError, SyncResult};
use crate::source::QuoteSource;
use crate::transfer::{self, ImportMode, ImportSummary};
use quotesync_storage::{QuoteStore, StorageError};
use quotesync_types::{LastViewed, Quote, QuoteCollection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Capacity of the notification channel.
const EVENT_CAPACITY: usize = 64;

/// Which entry point started a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Auto,
    Manual,
}

/// Observable phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Fetching,
    Applying,
    AwaitingResolution,
}

/// The user's decision for a pending manual sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Overwrite local quotes with the fetched list.
    ApplyServer,
    /// Discard the fetched list.
    KeepLocal,
}

/// Result of a sync call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to apply; nothing was written.
    NoChanges,
    /// The server list replaced the local one.
    Applied(DiffResult),
    /// A manual sync found differences and is waiting for `resolve`.
    PendingResolution(DiffResult),
    /// A pending manual sync was resolved in favour of local quotes.
    KeptLocal,
}

/// Notifications for whatever surface shows sync status.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Started { mode: SyncMode },
    NoChanges { mode: SyncMode },
    PendingResolution { diff: DiffResult },
    Applied { mode: SyncMode, diff: DiffResult },
    KeptLocal,
    Failed { mode: SyncMode, reason: String },
    TickSkipped,
    StorageUnavailable { reason: String },
    QuoteAdded { quote: Quote },
    Imported { summary: ImportSummary },
}

enum PhaseState {
    Idle,
    Fetching,
    Applying,
    AwaitingResolution {
        remote: QuoteCollection,
        diff: DiffResult,
    },
}

impl PhaseState {
    fn phase(&self) -> SyncPhase {
        match self {
            PhaseState::Idle => SyncPhase::Idle,
            PhaseState::Fetching => SyncPhase::Fetching,
            PhaseState::Applying => SyncPhase::Applying,
            PhaseState::AwaitingResolution { .. } => SyncPhase::AwaitingResolution,
        }
    }
}

/// Puts the phase back to `Idle` when dropped, unless disarmed.
struct IdleOnDrop<'a> {
    phase: &'a Mutex<PhaseState>,
    armed: bool,
}

impl<'a> IdleOnDrop<'a> {
    fn new(phase: &'a Mutex<PhaseState>) -> Self {
        Self { phase, armed: true }
    }

    /// Leaves the phase as it is on drop.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = PhaseState::Idle;
        }
    }
}

struct AutoSyncTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Orchestrates sync between the quote store, the book and a remote source.
pub struct SyncController {
    config: SyncConfig,
    store: Arc<dyn QuoteStore>,
    source: Arc<dyn QuoteSource>,
    book: RwLock<QuoteBook>,
    phase: Mutex<PhaseState>,
    events: broadcast::Sender<SyncEvent>,
    /// Set while saves are failing; cleared by the next successful save.
    storage_degraded: AtomicBool,
    auto_task: Mutex<Option<AutoSyncTask>>,
    publishes: Mutex<JoinSet<()>>,
}

impl SyncController {
    /// Creates a controller, loading the book from `store`.
    pub fn new(
        store: Arc<dyn QuoteStore>,
        source: Arc<dyn QuoteSource>,
        config: SyncConfig,
    ) -> Self {
        let book = QuoteBook::load_or_default(store.as_ref());
        Self::with_book(store, source, config, book)
    }

    /// Creates a controller around an existing book.
    pub fn with_book(
        store: Arc<dyn QuoteStore>,
        source: Arc<dyn QuoteSource>,
        config: SyncConfig,
        book: QuoteBook,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            store,
            source,
            book: RwLock::new(book),
            phase: Mutex::new(PhaseState::Idle),
            events,
            storage_degraded: AtomicBool::new(false),
            auto_task: Mutex::new(None),
            publishes: Mutex::new(JoinSet::new()),
        }
    }

    /// Subscribes to sync notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> SyncPhase {
        self.lock_phase().phase()
    }

    /// The diff awaiting resolution, if any.
    pub fn pending_diff(&self) -> Option<DiffResult> {
        match &*self.lock_phase() {
            PhaseState::AwaitingResolution { diff, .. } => Some(diff.clone()),
            _ => None,
        }
    }

    /// Snapshot of the current collection.
    pub async fn quotes(&self) -> QuoteCollection {
        self.book.read().await.quotes().clone()
    }

    /// Distinct categories in first-seen order.
    pub async fn categories(&self) -> Vec<String> {
        self.book.read().await.categories()
    }

    /// Whether saves are currently failing.
    pub fn is_storage_degraded(&self) -> bool {
        self.storage_degraded.load(Ordering::SeqCst)
    }

    // ── Sync entry points ────────────────────────────────────────

    /// Fetches the server list and lets it win unconditionally.
    pub async fn auto_sync(&self) -> SyncResult<SyncOutcome> {
        let (idle, remote) = self.begin_and_fetch(SyncMode::Auto).await?;
        self.set_phase(PhaseState::Applying);

        let diff = {
            let book = self.book.read().await;
            diff(&remote, book.quotes())
        };
        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            conflicts = diff.conflicts.len(),
            "auto sync: applying server quotes"
        );

        let changed = self.replace_and_persist(remote).await;
        drop(idle);

        if changed {
            self.emit(SyncEvent::Applied {
                mode: SyncMode::Auto,
                diff: diff.clone(),
            });
            Ok(SyncOutcome::Applied(diff))
        } else {
            self.emit(SyncEvent::NoChanges {
                mode: SyncMode::Auto,
            });
            Ok(SyncOutcome::NoChanges)
        }
    }

    /// Fetches the server list and, if it differs, waits for a resolution.
    pub async fn manual_sync(&self) -> SyncResult<SyncOutcome> {
        let (idle, remote) = self.begin_and_fetch(SyncMode::Manual).await?;

        let diff = {
            let book = self.book.read().await;
            diff(&remote, book.quotes())
        };

        if diff.is_empty() {
            drop(idle);
            info!("manual sync: no changes");
            self.emit(SyncEvent::NoChanges {
                mode: SyncMode::Manual,
            });
            return Ok(SyncOutcome::NoChanges);
        }

        info!(
            changes = diff.change_count(),
            "manual sync: awaiting resolution"
        );
        self.set_phase(PhaseState::AwaitingResolution {
            remote,
            diff: diff.clone(),
        });
        idle.disarm();
        self.emit(SyncEvent::PendingResolution { diff: diff.clone() });
        Ok(SyncOutcome::PendingResolution(diff))
    }

    /// Resolves a pending manual sync. Only the first resolution is accepted.
    pub async fn resolve(&self, resolution: Resolution) -> SyncResult<SyncOutcome> {
        let (remote, diff) = {
            let mut phase = self.lock_phase();
            match std::mem::replace(&mut *phase, PhaseState::Applying) {
                PhaseState::AwaitingResolution { remote, diff } => (remote, diff),
                other => {
                    *phase = other;
                    return Err(SyncError::NoPendingResolution);
                }
            }
        };
        let idle = IdleOnDrop::new(&self.phase);

        let outcome = match resolution {
            Resolution::ApplyServer => {
                self.replace_and_persist(remote).await;
                info!("manual sync: applied server quotes");
                self.emit(SyncEvent::Applied {
                    mode: SyncMode::Manual,
                    diff: diff.clone(),
                });
                SyncOutcome::Applied(diff)
            }
            Resolution::KeepLocal => {
                info!("manual sync: kept local quotes");
                self.emit(SyncEvent::KeptLocal);
                SyncOutcome::KeptLocal
            }
        };

        drop(idle);
        Ok(outcome)
    }

    /// Claims the phase and fetches. The returned guard resets the phase to
    /// `Idle` when the sync ends or its future is dropped.
    async fn begin_and_fetch(
        &self,
        mode: SyncMode,
    ) -> SyncResult<(IdleOnDrop<'_>, QuoteCollection)> {
        {
            let mut phase = self.lock_phase();
            if !matches!(*phase, PhaseState::Idle) {
                return Err(SyncError::SyncInProgress);
            }
            *phase = PhaseState::Fetching;
        }
        let idle = IdleOnDrop::new(&self.phase);
        self.emit(SyncEvent::Started { mode });
        debug!(?mode, source = self.source.name(), "sync started");

        match self.source.fetch().await {
            Ok(remote) => Ok((idle, remote)),
            Err(e) => {
                drop(idle);
                warn!(?mode, "sync failed: {e}");
                self.emit(SyncEvent::Failed {
                    mode,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn set_phase(&self, next: PhaseState) {
        *self.lock_phase() = next;
    }

    fn lock_phase(&self) -> MutexGuard<'_, PhaseState> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Timer ────────────────────────────────────────────────────

    /// Starts automatic sync every `period`. The first tick fires after one
    /// full period.
    pub fn start_auto_sync(self: &Arc<Self>, period: Duration) -> SyncResult<()> {
        let mut slot = self
            .auto_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return Err(SyncError::AlreadyRunning);
        }

        let (shutdown, mut stop) = watch::channel(false);
        let controller = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stop.changed() => break,
                    _ = ticker.tick() => {}
                }
                if !Self::tick(&controller).await {
                    break;
                }
            }
            debug!("auto sync task stopped");
        });

        info!(period_secs = period.as_secs(), "auto sync started");
        *slot = Some(AutoSyncTask { shutdown, handle });
        Ok(())
    }

    /// Runs one timer tick. Returns false once the controller is gone.
    async fn tick(controller: &Weak<Self>) -> bool {
        let Some(controller) = controller.upgrade() else {
            return false;
        };
        match controller.auto_sync().await {
            Ok(_) => {}
            Err(SyncError::SyncInProgress) => {
                debug!("auto sync tick skipped: sync in progress");
                controller.emit(SyncEvent::TickSkipped);
            }
            // Already reported through `SyncEvent::Failed`.
            Err(_) => {}
        }
        true
    }

    /// Stops automatic sync, waiting for an in-flight tick to finish.
    /// Returns false if it was not running.
    pub async fn stop_auto_sync(&self) -> bool {
        let task = self
            .auto_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(task) = task else {
            return false;
        };
        let _ = task.shutdown.send(true);
        if let Err(e) = task.handle.await {
            debug!("auto sync task ended abnormally: {e}");
        }
        info!("auto sync stopped");
        true
    }

    /// Whether the auto-sync timer is running.
    pub fn is_auto_sync_running(&self) -> bool {
        self.auto_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    // ── Local mutations ──────────────────────────────────────────

    /// Adds a quote, persists it, records it as last viewed, and echoes it
    /// to the remote in the background. See [`Self::flush_publishes`].
    pub async fn add_quote(&self, text: &str, category: &str) -> SyncResult<Quote> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() || category.is_empty() {
            return Err(SyncError::InvalidQuote(
                "both quote text and category are required".to_string(),
            ));
        }

        let quote = Quote::new(text, category);
        let (snapshot, shown) = {
            let mut book = self.book.write().await;
            book.push(quote.clone());
            (book.quotes().clone(), book.position(&quote))
        };
        self.persist(&snapshot);
        if let Some(index) = shown {
            self.record_view(index);
        }
        self.emit(SyncEvent::QuoteAdded {
            quote: quote.clone(),
        });

        if self.config.publish_new_quotes {
            let source = self.source.clone();
            let echoed = quote.clone();
            let mut publishes = self
                .publishes
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            while publishes.try_join_next().is_some() {}
            publishes.spawn(async move {
                if let Err(e) = source.publish(&echoed).await {
                    debug!("publishing new quote failed: {e}");
                }
            });
        }

        Ok(quote)
    }

    /// Waits for background publishes started by [`Self::add_quote`].
    /// Each one is bounded by the source's request timeout.
    pub async fn flush_publishes(&self) {
        let mut pending = std::mem::take(
            &mut *self
                .publishes
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                debug!("publish task ended abnormally: {e}");
            }
        }
    }

    /// Imports a JSON document of quotes.
    pub async fn import_json(&self, json: &str, mode: ImportMode) -> SyncResult<ImportSummary> {
        let batch = transfer::parse_import(json)?;
        let imported = batch.quotes.len();
        let first = batch.quotes.get(0).cloned();

        let (snapshot, shown) = {
            let mut book = self.book.write().await;
            match mode {
                ImportMode::Merge => book.extend(batch.quotes),
                ImportMode::Replace => {
                    book.replace(batch.quotes);
                }
            }
            let shown = first.and_then(|quote| book.position(&quote));
            (book.quotes().clone(), shown)
        };
        self.persist(&snapshot);
        if let Some(index) = shown {
            self.record_view(index);
        }

        let summary = ImportSummary {
            imported,
            rejected: batch.rejected,
            mode,
            total: snapshot.len(),
        };
        info!(imported, rejected = batch.rejected, ?mode, "imported quotes");
        self.emit(SyncEvent::Imported { summary });
        Ok(summary)
    }

    /// Exports the current collection as pretty-printed JSON.
    pub async fn export_json(&self) -> SyncResult<String> {
        transfer::export(self.book.read().await.quotes())
    }

    /// Picks a random quote, optionally within `category`, and records it
    /// as last viewed.
    pub async fn random_quote(&self, category: Option<&str>) -> Option<Quote> {
        let picked = {
            let book = self.book.read().await;
            book.random(category, &mut rand::thread_rng())
                .map(|(index, quote)| (index, quote.clone()))
        };
        let (index, quote) = picked?;
        self.record_view(index);
        Some(quote)
    }

    /// Returns the last viewed quote if its index is still valid.
    pub async fn last_viewed(&self) -> Option<Quote> {
        let viewed = self.store.load_last_viewed()?;
        let book = self.book.read().await;
        viewed
            .index_within(book.len())
            .and_then(|index| book.get(index).cloned())
    }

    /// Remembers `index` as the last viewed quote.
    pub fn record_view(&self, index: usize) {
        self.store.save_last_viewed(&LastViewed::now(index));
    }

    // ── Persistence ──────────────────────────────────────────────

    /// Replaces the book with `remote` and persists it. Returns whether the
    /// collection changed. An unchanged collection is only written while the
    /// store is behind after a failed save.
    async fn replace_and_persist(&self, remote: QuoteCollection) -> bool {
        let (snapshot, changed) = {
            let mut book = self.book.write().await;
            let changed = book.quotes() != &remote;
            if changed {
                book.replace(remote);
            }
            (book.quotes().clone(), changed)
        };
        if changed || self.is_storage_degraded() {
            self.persist(&snapshot);
        }
        changed
    }

    /// Saves a snapshot. Failures leave the book as the only copy.
    fn persist(&self, snapshot: &QuoteCollection) {
        match self.store.save(snapshot) {
            Ok(()) => {
                if self.storage_degraded.swap(false, Ordering::SeqCst) {
                    info!("quote store writable again");
                }
            }
            Err(e) => self.storage_failed(e),
        }
    }

    fn storage_failed(&self, error: StorageError) {
        if self.storage_degraded.swap(true, Ordering::SeqCst) {
            debug!("quote store still unavailable: {error}");
            return;
        }
        warn!("failed to persist quotes, continuing in memory only: {error}");
        self.emit(SyncEvent::StorageUnavailable {
            reason: error.to_string(),
        });
    }

    fn emit(&self, event: SyncEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        let task = match self.auto_task.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            task.handle.abort();
        }
    }
}
