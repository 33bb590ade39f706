use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One extracted fragment of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Inner markup of the matched node (trimmed)
    pub content: String,

    /// Rendered plain text of the matched node (trimmed)
    pub text: String,

    /// ISO-8601 moment the item was extracted or last edited
    pub timestamp: String,
}

impl ContentItem {
    /// Create a new content item
    pub fn new(content: String, text: String, timestamp: String) -> Self {
        Self {
            content,
            text,
            timestamp,
        }
    }

    /// True when both the markup and the text are empty
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.text.is_empty()
    }
}

/// A fragment handed to the store, before it is stamped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub content: String,
    pub text: String,
}

impl NewItem {
    pub fn new(content: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.text.is_empty()
    }

    /// Attach a timestamp, producing a storable item
    pub fn stamp(self, timestamp: &str) -> ContentItem {
        ContentItem::new(self.content, self.text, timestamp.to_string())
    }
}

impl From<ContentItem> for NewItem {
    fn from(item: ContentItem) -> Self {
        Self {
            content: item.content,
            text: item.text,
        }
    }
}

/// Everything stored for a single source URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Surrogate key assigned by the store
    pub id: u64,

    /// Source URL, unique across records
    pub url: String,

    /// Items in the order they were added
    pub content: Vec<ContentItem>,

    /// Moment of the last mutation
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// Create a new record
    pub fn new(id: u64, url: String, content: Vec<ContentItem>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            url,
            content,
            timestamp,
        }
    }

    /// Texts of all items, in order
    pub fn texts(&self) -> Vec<&str> {
        self.content.iter().map(|c| c.text.as_str()).collect()
    }
}
