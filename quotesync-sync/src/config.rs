//! Sync configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default remote endpoint (a public mock API returning posts).
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// Category used for remote records that carry no title.
pub const FALLBACK_CATEGORY: &str = "Server";

/// Configuration for the remote source and the sync controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// URL fetched on every sync and posted to when a quote is added.
    pub endpoint: String,
    /// Timeout for a single HTTP request (seconds).
    pub request_timeout_secs: u64,
    /// How often automatic sync runs (seconds).
    pub auto_sync_interval_secs: u64,
    /// Maximum number of remote records mapped into quotes.
    pub max_records: usize,
    /// Fixed category for every remote quote. When unset, the record title is used.
    pub category_literal: Option<String>,
    /// Whether newly added quotes are echoed to the endpoint.
    pub publish_new_quotes: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 10,
            auto_sync_interval_secs: 30,
            max_records: 10,
            category_literal: None,
            publish_new_quotes: true,
        }
    }
}

impl SyncConfig {
    /// Parses a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Auto-sync period as a `Duration`, never shorter than one second.
    pub fn auto_sync_interval(&self) -> Duration {
        Duration::from_secs(self.auto_sync_interval_secs.max(1))
    }
}
