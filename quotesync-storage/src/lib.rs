//! Local persistence for quotesync.
//!
//! The quote collection is mirrored into a single key of a key-value store as
//! one JSON array. A second key remembers the last viewed quote.
//!
//! # Architecture
//!
//! - `QuoteStore` is the capability the sync layer depends on. Backends only
//!   implement raw `read`/`write` of string values; snapshot encoding and
//!   shape validation are shared provided methods.
//! - `SqliteStore` keeps the slots in a small SQLite table.
//! - `MemoryStore` keeps them in a map and can simulate write failures.

mod error;
mod memory;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use quotesync_types::{LastViewed, QuoteCollection};
use tracing::{debug, warn};

/// Key holding the JSON-encoded quote collection.
pub const QUOTES_KEY: &str = "dqg_quotes_v1";

/// Key holding the JSON-encoded `LastViewed` marker.
pub const LAST_VIEWED_KEY: &str = "dqg_last_index";

/// A persistent key-value slot holding the quote snapshot.
pub trait QuoteStore: Send + Sync {
    /// Reads the raw value stored under `key`.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrites the raw value stored under `key`.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Loads the persisted collection.
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored value fails
    /// shape validation; the caller should fall back to its defaults. Only
    /// backend failures are reported as errors.
    fn load(&self) -> StorageResult<Option<QuoteCollection>> {
        let Some(raw) = self.read(QUOTES_KEY)? else {
            debug!("no persisted quotes");
            return Ok(None);
        };
        Ok(decode_snapshot(&raw))
    }

    /// Overwrites the persisted collection.
    fn save(&self, quotes: &QuoteCollection) -> StorageResult<()> {
        let json = serde_json::to_string(quotes)?;
        self.write(QUOTES_KEY, &json)?;
        debug!(count = quotes.len(), "persisted quotes");
        Ok(())
    }

    /// Loads the last viewed marker. Any failure reads as absent.
    fn load_last_viewed(&self) -> Option<LastViewed> {
        let raw = self.read(LAST_VIEWED_KEY).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    /// Saves the last viewed marker. Failures are ignored.
    fn save_last_viewed(&self, viewed: &LastViewed) {
        let Ok(json) = serde_json::to_string(viewed) else {
            return;
        };
        if let Err(e) = self.write(LAST_VIEWED_KEY, &json) {
            debug!("failed to save last viewed marker: {e}");
        }
    }
}

/// Decodes and strictly validates a persisted snapshot.
///
/// Malformed data is discarded with a warning rather than surfaced.
pub fn decode_snapshot(raw: &str) -> Option<QuoteCollection> {
    match QuoteCollection::from_json(raw) {
        Ok(quotes) => Some(quotes),
        Err(e) => {
            warn!("discarding malformed persisted quotes: {e}");
            None
        }
    }
}
