//! Diff engine: classifies remote vs. local collections by quote text.
//!
//! Quote text is the join key. Within one side, later duplicates shadow
//! earlier ones in the lookup, so a side with repeated texts can report
//! spurious conflicts against itself. That is a known limitation of keying
//! on text alone.

use quotesync_types::{Quote, QuoteCollection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A quote present on both sides with different categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub text: String,
    pub local_category: String,
    pub server_category: String,
}

/// Differences between a server collection and the local one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Server quotes whose text is unknown locally.
    pub added: Vec<Quote>,
    /// Local quotes whose text is unknown to the server.
    pub removed: Vec<Quote>,
    /// Quotes whose text matches but whose category differs.
    pub conflicts: Vec<Conflict>,
}

impl DiffResult {
    /// Returns true if the two sides agree.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.conflicts.is_empty()
    }

    /// Total number of classified entries.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.conflicts.len()
    }
}

fn lookup(quotes: &QuoteCollection) -> HashMap<&str, &Quote> {
    quotes.iter().map(|q| (q.text.as_str(), q)).collect()
}

/// Compares `server` against `local`.
pub fn diff(server: &QuoteCollection, local: &QuoteCollection) -> DiffResult {
    let server_by_text = lookup(server);
    let local_by_text = lookup(local);
    let mut result = DiffResult::default();

    for remote in server {
        match local_by_text.get(remote.text.as_str()) {
            None => result.added.push(remote.clone()),
            Some(mine) if mine.category != remote.category => {
                result.conflicts.push(Conflict {
                    text: remote.text.clone(),
                    local_category: mine.category.clone(),
                    server_category: remote.category.clone(),
                });
            }
            Some(_) => {}
        }
    }

    result.removed = local
        .iter()
        .filter(|mine| !server_by_text.contains_key(mine.text.as_str()))
        .cloned()
        .collect();

    result
}
