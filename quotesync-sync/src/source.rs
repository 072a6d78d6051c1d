//! Remote quote sources.
//!
//! A source returns the remote view of the collection and accepts
//! best-effort echoes of locally added quotes. The HTTP implementation talks
//! to a JSON endpoint returning `{title, body}` records.

use crate::config::{FALLBACK_CATEGORY, SyncConfig};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use quotesync_types::{Quote, QuoteCollection};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Where remote quotes come from.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of the source, for logs.
    fn name(&self) -> &str;

    /// Fetches the remote collection.
    async fn fetch(&self) -> SyncResult<QuoteCollection>;

    /// Echoes a newly added quote to the remote. The response is not used.
    async fn publish(&self, quote: &Quote) -> SyncResult<()>;
}

/// Maps one remote record into a quote.
///
/// Text comes from `body`, falling back to `title`. Category is the literal
/// when given, otherwise `title`, otherwise [`FALLBACK_CATEGORY`]. Records
/// with no usable text yield `None`.
pub fn map_record(record: &Value, category_literal: Option<&str>) -> Option<Quote> {
    let title = string_field(record, "title");
    let text = string_field(record, "body").or(title)?;
    let category = category_literal.or(title).unwrap_or(FALLBACK_CATEGORY);
    Some(Quote::new(text, category))
}

fn string_field<'a>(record: &'a Value, name: &str) -> Option<&'a str> {
    record
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Body posted when echoing a quote.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody<'a> {
    title: &'a str,
    body: &'a str,
    user_id: u32,
}

/// Quote source backed by a JSON HTTP endpoint.
pub struct HttpQuoteSource {
    endpoint: String,
    max_records: usize,
    category_literal: Option<String>,
    client: Client,
}

impl HttpQuoteSource {
    /// Creates a source from the sync configuration.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            max_records: config.max_records,
            category_literal: config.category_literal.clone(),
            client,
        })
    }

    /// The endpoint this source talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> SyncResult<QuoteCollection> {
        debug!("Fetching remote quotes from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SyncError::Protocol(format!("failed to parse remote quotes: {e}")))?;

        let records = payload
            .as_array()
            .ok_or_else(|| SyncError::Protocol("expected a JSON array of records".to_string()))?;

        let quotes: QuoteCollection = records
            .iter()
            .take(self.max_records)
            .filter_map(|r| map_record(r, self.category_literal.as_deref()))
            .collect();

        info!(
            "Fetched {} remote quotes ({} records received)",
            quotes.len(),
            records.len()
        );
        Ok(quotes)
    }

    async fn publish(&self, quote: &Quote) -> SyncResult<()> {
        let body = PublishBody {
            title: &quote.category,
            body: &quote.text,
            user_id: 1,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("publish failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        debug!("Published quote to {}", self.endpoint);
        Ok(())
    }
}

/// A scripted source for testing.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};
    use tokio::sync::Semaphore;

    /// Returns a fixed remote collection, optionally failing or blocking.
    #[derive(Debug, Default)]
    pub struct MockSource {
        remote: QuoteCollection,
        failures: Mutex<VecDeque<String>>,
        published: Mutex<Vec<Quote>>,
        fetches: AtomicUsize,
        gate: Option<Arc<Semaphore>>,
    }

    impl MockSource {
        /// Creates a source that always returns `remote`.
        pub fn new(remote: QuoteCollection) -> Self {
            Self {
                remote,
                ..Default::default()
            }
        }

        /// Creates a source whose fetches block until a permit is added to
        /// the returned semaphore. Each permit releases one fetch.
        pub fn gated(remote: QuoteCollection) -> (Self, Arc<Semaphore>) {
            let gate = Arc::new(Semaphore::new(0));
            let source = Self {
                remote,
                gate: Some(gate.clone()),
                ..Default::default()
            };
            (source, gate)
        }

        /// Makes the next fetch fail with a network error.
        pub fn fail_next(&self, reason: impl Into<String>) {
            self.failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(reason.into());
        }

        /// Number of fetches attempted.
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        /// Quotes published so far.
        pub fn published(&self) -> Vec<Quote> {
            self.published
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait]
    impl QuoteSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch(&self) -> SyncResult<QuoteCollection> {
            self.fetches.fetch_add(1, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.acquire().await.map_err(|_| SyncError::ChannelClosed)?.forget();
            }

            let failure = self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            if let Some(reason) = failure {
                return Err(SyncError::Network(reason));
            }

            Ok(self.remote.clone())
        }

        async fn publish(&self, quote: &Quote) -> SyncResult<()> {
            self.published
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(quote.clone());
            Ok(())
        }
    }
}
