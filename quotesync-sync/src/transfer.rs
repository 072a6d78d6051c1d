//! JSON import and export of whole collections.
//!
//! Imports drop malformed records and fail only when nothing valid remains.

use crate::error::{SyncError, SyncResult};
use quotesync_types::QuoteCollection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// How an imported batch is combined with the current collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Append the batch after the existing quotes.
    Merge,
    /// Discard the existing quotes.
    Replace,
}

/// A validated import batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    pub quotes: QuoteCollection,
    /// Records dropped for failing shape validation.
    pub rejected: usize,
}

/// Outcome of an import applied to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub rejected: usize,
    pub mode: ImportMode,
    pub total: usize,
}

/// Parses and validates an import document.
pub fn parse_import(json: &str) -> SyncResult<ImportBatch> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SyncError::MalformedImport(format!("invalid JSON: {e}")))?;

    let (quotes, rejected) = QuoteCollection::from_value_lenient(&value)
        .map_err(|e| SyncError::MalformedImport(e.to_string()))?;

    if quotes.is_empty() {
        return Err(SyncError::MalformedImport(
            "no valid quote objects found".to_string(),
        ));
    }
    if rejected > 0 {
        warn!("import dropped {rejected} malformed records");
    }

    Ok(ImportBatch { quotes, rejected })
}

/// Encodes a collection as a pretty-printed JSON array.
pub fn export(quotes: &QuoteCollection) -> SyncResult<String> {
    Ok(serde_json::to_string_pretty(quotes)?)
}
