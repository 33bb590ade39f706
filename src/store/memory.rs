//! In-memory [`Backend`] used by tests and throwaway sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Backend, StoreError, id_after, sort_newest_first};
use crate::results::Record;

struct State {
    records: HashMap<String, Record>,
    next_id: u64,
}

/// Records kept in a `HashMap` keyed by URL
pub struct MemoryBackend {
    state: RwLock<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                records: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, url: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.state.read().await.records.get(url).cloned())
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let after = id_after(record.id)?;
        let mut state = self.state.write().await;
        state.next_id = state.next_id.max(after);
        state.records.insert(record.url.clone(), record);
        Ok(())
    }

    async fn remove(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self.state.write().await.records.remove(url).is_some())
    }

    async fn scan(&self) -> Result<Vec<Record>, StoreError> {
        let mut records = self
            .state
            .read()
            .await
            .records
            .values()
            .cloned()
            .collect::<Vec<_>>();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.state.write().await.records.clear();
        Ok(())
    }

    async fn next_id(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id = id_after(id)?;
        Ok(id)
    }
}
