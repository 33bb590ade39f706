//! Composite identifiers addressing one item inside a record.
//!
//! An identifier is the record URL followed by two `-`-separated
//! components: a fixed marker and the item's position,
//! e.g. `https://a.com/x-1-item-3`. URLs routinely contain `-`, so the
//! decoder only treats the final two separators as structural and
//! hands everything before them back as the URL.
//!
//! Positions shift when an earlier item is deleted, so an identifier is
//! only valid until the next mutation of its record.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the URL and the trailing components
pub const SEPARATOR: char = '-';

/// Fixed middle component
pub const MARKER: &str = "item";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("malformed item identifier {id:?}: {reason}")]
    Malformed { id: String, reason: &'static str },
}

/// Typed form of a composite identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId {
    pub url: String,
    pub index: usize,
}

impl ItemId {
    pub fn new(url: impl Into<String>, index: usize) -> Self {
        Self {
            url: url.into(),
            index,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{MARKER}{SEPARATOR}{}", self.url, self.index)
    }
}

impl FromStr for ItemId {
    type Err = IdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| IdError::Malformed {
            id: id.to_string(),
            reason,
        };

        let (head, index) = id
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| malformed("missing index separator"))?;
        let (url, marker) = head
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| malformed("missing marker separator"))?;

        if marker != MARKER {
            return Err(malformed("unexpected marker"));
        }
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("index is not a non-negative integer"));
        }
        let index = index
            .parse::<usize>()
            .map_err(|_| malformed("index out of range"))?;

        Ok(Self::new(url, index))
    }
}

/// Builds the identifier for the item at `index` under `url`
pub fn encode(url: &str, index: usize) -> String {
    ItemId::new(url, index).to_string()
}

/// Splits an identifier back into `(url, index)`
pub fn decode(id: &str) -> Result<(String, usize), IdError> {
    let ItemId { url, index } = id.parse()?;
    Ok((url, index))
}
