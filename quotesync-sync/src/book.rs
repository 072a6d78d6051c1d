//! The in-memory quote collection owned by the sync controller.

use quotesync_storage::QuoteStore;
use quotesync_types::{Quote, QuoteCollection, default_quotes};
use rand::Rng;
use tracing::{info, warn};

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// The live quote collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteBook {
    quotes: QuoteCollection,
}

impl QuoteBook {
    /// Creates a book holding `quotes`.
    pub fn new(quotes: QuoteCollection) -> Self {
        Self { quotes }
    }

    /// Loads the persisted collection, falling back to the built-in quotes
    /// when nothing valid is stored or the store cannot be read.
    pub fn load_or_default(store: &dyn QuoteStore) -> Self {
        match store.load() {
            Ok(Some(quotes)) => {
                info!("Loaded {} persisted quotes", quotes.len());
                Self::new(quotes)
            }
            Ok(None) => Self::new(default_quotes()),
            Err(e) => {
                warn!("quote store unreadable, using built-in quotes: {e}");
                Self::new(default_quotes())
            }
        }
    }

    /// The current collection.
    pub fn quotes(&self) -> &QuoteCollection {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Replaces the whole collection, returning the previous one.
    pub fn replace(&mut self, quotes: QuoteCollection) -> QuoteCollection {
        std::mem::replace(&mut self.quotes, quotes)
    }

    /// Appends a quote.
    pub fn push(&mut self, quote: Quote) {
        self.quotes.push(quote);
    }

    /// Appends every quote from `quotes`.
    pub fn extend(&mut self, quotes: QuoteCollection) {
        self.quotes.extend(quotes);
    }

    /// Returns the quote at `index`.
    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    /// Position of the first quote equal to `quote`.
    pub fn position(&self, quote: &Quote) -> Option<usize> {
        self.quotes.iter().position(|q| q == quote)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for quote in &self.quotes {
            if !seen.contains(&quote.category) {
                seen.push(quote.category.clone());
            }
        }
        seen
    }

    /// Quotes in `category` with their positions in the book.
    ///
    /// `None` or [`ALL_CATEGORIES`] selects everything.
    pub fn filtered(&self, category: Option<&str>) -> Vec<(usize, &Quote)> {
        let category = category.filter(|c| *c != ALL_CATEGORIES);
        self.quotes
            .iter()
            .enumerate()
            .filter(|(_, q)| category.is_none_or(|c| q.category == c))
            .collect()
    }

    /// Picks a quote uniformly from the filtered pool.
    pub fn random<R: Rng + ?Sized>(
        &self,
        category: Option<&str>,
        rng: &mut R,
    ) -> Option<(usize, &Quote)> {
        let pool = self.filtered(category);
        if pool.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..pool.len());
        Some(pool[pick])
    }
}
