//! URL-keyed content store.
//!
//! [`ContentStore`] keeps one [`Record`] per source URL and accumulates
//! items across repeated scrapes: adding content for a URL that is
//! already stored appends to its item list and never replaces it.
//! Single items are addressed with composite identifiers from
//! [`crate::ident`].
//!
//! Persistence is delegated to a [`Backend`]. The store serializes all
//! mutations behind one async lock and commits each of them through a
//! single backend write, so readers only ever see whole mutations.
//! Mutations run on a spawned task: dropping the returned future does
//! not interrupt a write that has already started.

pub mod file;
pub mod memory;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::ident::{self, IdError};
use crate::results::{ContentItem, NewItem, Record};
use crate::utils;

pub use file::FileBackend;
pub use memory::MemoryBackend;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Content not found for {0}")]
    NotFound(String),
    #[error("Item index {index} out of range ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    MalformedIdentifier(#[from] IdError),
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Store task failed: {0}")]
    Task(String),
}

/// Persistence layer behind a [`ContentStore`]
///
/// A key-value view of records keyed by URL. Each call must be atomic
/// with respect to the others; the store never needs more than one
/// write per mutation.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Look up the record for `url`
    async fn get(&self, url: &str) -> Result<Option<Record>, StoreError>;

    /// Insert or replace the record stored under `record.url`
    async fn put(&self, record: Record) -> Result<(), StoreError>;

    /// Delete the record for `url`, reporting whether one existed
    async fn remove(&self, url: &str) -> Result<bool, StoreError>;

    /// All records, most recently mutated first
    async fn scan(&self) -> Result<Vec<Record>, StoreError>;

    /// Delete every record
    async fn clear(&self) -> Result<(), StoreError>;

    /// Reserve a fresh surrogate id
    async fn next_id(&self) -> Result<u64, StoreError>;
}

/// The id following `id`, refusing to wrap around
pub fn id_after(id: u64) -> Result<u64, StoreError> {
    id.checked_add(1)
        .ok_or_else(|| StoreError::InvalidInput(format!("record id {} leaves no room for more", id)))
}

/// Orders records by timestamp descending, newest id first on ties
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

/// One item of the flattened listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Composite identifier, valid until the record's next mutation
    pub id: String,
    pub url: String,
    pub index: usize,
    pub item: ContentItem,
}

/// Strictly increasing mutation timestamps
struct Clock {
    last: DateTime<Utc>,
}

impl Clock {
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.last = if now > self.last {
            now
        } else {
            self.last + chrono::Duration::microseconds(1)
        };
        self.last
    }
}

struct Inner {
    backend: Box<dyn Backend>,
    // Held for the whole of every mutation.
    clock: Mutex<Clock>,
}

/// Append-only, URL-keyed store of extracted content
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<Inner>,
}

impl ContentStore {
    /// Wrap an arbitrary backend
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                clock: Mutex::new(Clock {
                    last: DateTime::<Utc>::MIN_UTC,
                }),
            }),
        }
    }

    /// A store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open (or create) a store persisted in the JSON file at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self::new(FileBackend::open(path).await?);
        if let Some(newest) = store.inner.backend.scan().await?.first() {
            store.inner.clock.lock().await.last = newest.timestamp;
        }
        Ok(store)
    }

    /// Append `items` to the record for `url`, creating the record if needed
    ///
    /// Returns the record id. Items with neither markup nor text are
    /// skipped; an empty URL or an empty remaining list is rejected.
    pub async fn append_or_create(
        &self,
        url: &str,
        items: Vec<NewItem>,
    ) -> Result<u64, StoreError> {
        let url = url.to_string();
        self.mutate(move |inner| async move { inner.append_or_create(&url, items).await })
            .await
    }

    /// Replace the markup of one item, leaving its text as it was
    pub async fn update_item(&self, id: &str, new_content: &str) -> Result<(), StoreError> {
        let (url, index) = ident::decode(id)?;
        let new_content = new_content.to_string();
        self.mutate(move |inner| async move { inner.update_item(&url, index, new_content).await })
            .await
    }

    /// Remove one item; the record goes away with its last item
    pub async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        let (url, index) = ident::decode(id)?;
        self.mutate(move |inner| async move { inner.delete_item(&url, index).await })
            .await
    }

    /// Remove every record
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.mutate(|inner| async move {
            let _clock = inner.clock.lock().await;
            inner.backend.clear().await?;
            ::log::info!("Cleared all stored content");
            Ok::<(), StoreError>(())
        })
        .await
    }

    /// Every record, most recently mutated first
    pub async fn all(&self) -> Result<Vec<Record>, StoreError> {
        self.inner.backend.scan().await
    }

    /// The record for a single URL
    pub async fn get(&self, url: &str) -> Result<Option<Record>, StoreError> {
        self.inner.backend.get(url).await
    }

    /// Flattened view of [`all`](Self::all) with an identifier per item
    pub async fn entries(&self) -> Result<Vec<Entry>, StoreError> {
        let records = self.all().await?;
        Ok(records
            .into_iter()
            .flat_map(|record| {
                let url = record.url;
                record
                    .content
                    .into_iter()
                    .enumerate()
                    .map(move |(index, item)| Entry {
                        id: ident::encode(&url, index),
                        url: url.clone(),
                        index,
                        item,
                    })
            })
            .collect())
    }

    async fn mutate<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(Arc<Inner>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(op(inner))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

impl Inner {
    async fn append_or_create(&self, url: &str, items: Vec<NewItem>) -> Result<u64, StoreError> {
        if url.is_empty() {
            return Err(StoreError::InvalidInput("URL is required".to_string()));
        }
        let items = items
            .into_iter()
            .filter(|item| !item.is_blank())
            .collect::<Vec<_>>();
        if items.is_empty() {
            return Err(StoreError::InvalidInput(
                "at least one non-empty item is required".to_string(),
            ));
        }

        let mut clock = self.clock.lock().await;
        let existing = self.backend.get(url).await?;
        let now = clock.tick();
        let stamp = utils::iso_timestamp(now);
        let added = items.len();
        let stamped = items.into_iter().map(|item| item.stamp(&stamp));

        match existing {
            Some(mut record) => {
                record.content.extend(stamped);
                record.timestamp = now;
                let id = record.id;
                let total = record.content.len();
                self.backend.put(record).await?;
                ::log::debug!(
                    "Appended {} items to record {} ({}), now {} items",
                    added,
                    id,
                    url,
                    total
                );
                Ok(id)
            }
            None => {
                let id = self.backend.next_id().await?;
                let record = Record::new(id, url.to_string(), stamped.collect(), now);
                self.backend.put(record).await?;
                ::log::debug!("Created record {} for {} with {} items", id, url, added);
                Ok(id)
            }
        }
    }

    async fn update_item(
        &self,
        url: &str,
        index: usize,
        new_content: String,
    ) -> Result<(), StoreError> {
        let mut clock = self.clock.lock().await;
        let mut record = self.locate(url, index).await?;

        let item = &mut record.content[index];
        if new_content.is_empty() && item.text.is_empty() {
            return Err(StoreError::InvalidInput(
                "update would leave the item empty".to_string(),
            ));
        }

        let now = clock.tick();
        item.content = new_content;
        item.timestamp = utils::iso_timestamp(now);
        record.timestamp = now;
        self.backend.put(record).await?;
        ::log::debug!("Updated item {} of {}", index, url);
        Ok(())
    }

    async fn delete_item(&self, url: &str, index: usize) -> Result<(), StoreError> {
        let mut clock = self.clock.lock().await;
        let mut record = self.locate(url, index).await?;

        record.content.remove(index);
        if record.content.is_empty() {
            self.backend.remove(url).await?;
            ::log::debug!("Deleted last item of {}, record removed", url);
        } else {
            record.timestamp = clock.tick();
            self.backend.put(record).await?;
            ::log::debug!("Deleted item {} of {}", index, url);
        }
        Ok(())
    }

    /// Fetch the record for `url` and check that `index` addresses an item in it
    async fn locate(&self, url: &str, index: usize) -> Result<Record, StoreError> {
        let record = self
            .backend
            .get(url)
            .await?
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        let len = record.content.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        Ok(record)
    }
}
