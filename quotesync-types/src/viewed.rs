//! Session continuity marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The last quote shown to the user, by position in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastViewed {
    pub index: usize,
    pub viewed_at: DateTime<Utc>,
}

impl LastViewed {
    /// Marks `index` as viewed now.
    pub fn now(index: usize) -> Self {
        Self {
            index,
            viewed_at: Utc::now(),
        }
    }

    /// Returns the index if it still points into a collection of `len` quotes.
    pub fn index_within(&self, len: usize) -> Option<usize> {
        (self.index < len).then_some(self.index)
    }
}
