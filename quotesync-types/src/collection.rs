//! Ordered quote collections.

use crate::quote::{Quote, kind_of};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered sequence of quotes.
///
/// Order is insertion order and carries no meaning. Duplicates are allowed;
/// the collection is only ever replaced wholesale or appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteCollection(Vec<Quote>);

impl QuoteCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the number of quotes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no quotes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a quote.
    pub fn push(&mut self, quote: Quote) {
        self.0.push(quote);
    }

    /// Appends every quote from `other`, preserving its order.
    pub fn extend(&mut self, other: QuoteCollection) {
        self.0.extend(other.0);
    }

    /// Returns the quote at `index`.
    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.0.get(index)
    }

    /// Iterates over the quotes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.0.iter()
    }

    /// Returns the quotes as a slice.
    pub fn as_slice(&self) -> &[Quote] {
        &self.0
    }

    /// Consumes the collection, returning the underlying vector.
    pub fn into_vec(self) -> Vec<Quote> {
        self.0
    }

    /// Validates an untrusted JSON value strictly.
    ///
    /// The value must be an array and every element must be a well-formed
    /// quote; the first bad element fails the whole value.
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value.as_array().ok_or(Error::NotAnArray(kind_of(value)))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Quote::from_value(item).map_err(|reason| Error::InvalidQuote { index, reason })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Validates an untrusted JSON value leniently.
    ///
    /// The value must be an array; malformed elements are dropped. Returns the
    /// accepted quotes along with how many elements were rejected.
    pub fn from_value_lenient(value: &Value) -> Result<(Self, usize)> {
        let items = value.as_array().ok_or(Error::NotAnArray(kind_of(value)))?;
        let accepted: Vec<Quote> = items
            .iter()
            .filter_map(|item| Quote::from_value(item).ok())
            .collect();
        let rejected = items.len() - accepted.len();
        Ok((Self(accepted), rejected))
    }

    /// Parses and strictly validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Encodes the collection as a compact JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

impl From<Vec<Quote>> for QuoteCollection {
    fn from(quotes: Vec<Quote>) -> Self {
        Self(quotes)
    }
}

impl FromIterator<Quote> for QuoteCollection {
    fn from_iter<I: IntoIterator<Item = Quote>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for QuoteCollection {
    type Item = Quote;
    type IntoIter = std::vec::IntoIter<Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuoteCollection {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The built-in collection used when nothing valid has been persisted.
pub fn default_quotes() -> QuoteCollection {
    QuoteCollection(vec![
        Quote::new(
            "The only limit to our realization of tomorrow is our doubts of today.",
            "Motivation",
        ),
        Quote::new(
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        Quote::new(
            "Success is not final; failure is not fatal: it is the courage to continue that counts.",
            "Success",
        ),
        Quote::new("Happiness depends upon ourselves.", "Happiness"),
    ])
}
