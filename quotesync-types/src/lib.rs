//! Core type definitions for quotesync.
//!
//! This crate defines the plain data shared by the storage and sync layers:
//! - `Quote`, the text/category pair
//! - `QuoteCollection`, the ordered sequence mirrored into storage
//! - `LastViewed`, the session-continuity marker
//!
//! Shape validation of untrusted JSON (persisted snapshots, imports, remote
//! payloads) lives here so every layer agrees on what a valid quote is.

mod collection;
mod quote;
mod viewed;

pub use collection::{QuoteCollection, default_quotes};
pub use quote::Quote;
pub use viewed::LastViewed;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("expected a JSON array of quotes, found {0}")]
    NotAnArray(&'static str),

    #[error("invalid quote at index {index}: {reason}")]
    InvalidQuote { index: usize, reason: String },
}
