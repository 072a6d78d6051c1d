//! The atomic unit of content.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A quote and the category it is filed under.
///
/// Sync treats `text` as the identity of a quote: two quotes with the same
/// text and different categories are one quote in conflict, not two quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

impl Quote {
    /// Creates a new quote.
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Builds a quote from an untrusted JSON value.
    ///
    /// The value must be an object whose `text` and `category` fields are both
    /// strings. Any other fields are ignored. Returns the reason on failure.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("expected an object, found {}", kind_of(value)))?;

        let text = match obj.get("text") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(format!("`text` must be a string, found {}", kind_of(other))),
            None => return Err("missing `text`".to_string()),
        };
        let category = match obj.get("category") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(format!("`category` must be a string, found {}", kind_of(other)));
            }
            None => return Err("missing `category`".to_string()),
        };

        Ok(Self { text, category })
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.text, self.category)
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
