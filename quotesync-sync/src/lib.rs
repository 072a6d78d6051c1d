//! Remote fetch, diff and sync control for quotesync.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Source**: fetches the remote quote list (`QuoteSource`, HTTP or mock)
//! - **Diff**: classifies remote vs. local quotes by text
//! - **Book**: the live in-memory collection
//! - **Controller**: orchestrates fetch, diff, resolution and persistence
//!
//! ## Sync Process
//!
//! 1. **Fetch**: ask the source for its list
//! 2. **Diff**: compare it with the book (added, removed, conflicting)
//! 3. **Resolve**: auto sync lets the server win; manual sync waits for
//!    apply-server or keep-local
//! 4. **Persist**: the chosen list is written back through the store
//!
//! # Example
//!
//! ```
//! use quotesync_storage::MemoryStore;
//! use quotesync_sync::source::mock::MockSource;
//! use quotesync_sync::{SyncConfig, SyncController};
//! use quotesync_types::QuoteCollection;
//! use std::sync::Arc;
//!
//! let controller = SyncController::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MockSource::new(QuoteCollection::new())),
//!     SyncConfig::default(),
//! );
//! assert!(!controller.is_auto_sync_running());
//! ```

pub mod book;
mod config;
mod controller;
pub mod diff;
mod error;
pub mod source;
pub mod transfer;

pub use book::{ALL_CATEGORIES, QuoteBook};
pub use config::{DEFAULT_ENDPOINT, FALLBACK_CATEGORY, SyncConfig};
pub use controller::{
    Resolution, SyncController, SyncEvent, SyncMode, SyncOutcome, SyncPhase,
};
pub use diff::{Conflict, DiffResult, diff};
pub use error::{SyncError, SyncResult};
pub use source::{HttpQuoteSource, QuoteSource, map_record};
pub use transfer::{ImportBatch, ImportMode, ImportSummary};
