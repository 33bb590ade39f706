//! JSON-file [`Backend`].
//!
//! The whole store lives in one file:
//!
//! ```json
//! { "next_id": 3, "records": [ { "id": 1, "url": "...", "content": [...], "timestamp": "..." } ] }
//! ```
//!
//! Every write serializes a full snapshot to `<file>.tmp`, syncs it to
//! disk and renames it over the target. In-memory state is replaced only after the rename
//! succeeds, so a failed write leaves both disk and memory as they were.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::{Backend, StoreError, id_after, sort_newest_first};
use crate::results::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default = "default_next_id")]
    next_id: u64,
    #[serde(default)]
    records: Vec<Record>,
}

fn default_next_id() -> u64 {
    1
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            next_id: default_next_id(),
            records: Vec::new(),
        }
    }
}

#[derive(Clone)]
struct State {
    records: HashMap<String, Record>,
    next_id: u64,
}

impl State {
    fn to_snapshot(&self) -> Snapshot {
        let mut records = self.records.values().cloned().collect::<Vec<_>>();
        sort_newest_first(&mut records);
        Snapshot {
            next_id: self.next_id,
            records,
        }
    }
}

/// Records persisted as a JSON document on disk
pub struct FileBackend {
    path: PathBuf,
    state: RwLock<State>,
}

impl FileBackend {
    /// Opens the store file at `path`, starting empty if it does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ::log::debug!("No store file at {}, starting empty", path.display());
                Snapshot::default()
            }
            Err(e) => return Err(e.into()),
        };

        let max_id = snapshot.records.iter().map(|r| r.id).max().unwrap_or(0);
        let next_id = snapshot.next_id.max(id_after(max_id)?);
        let records = snapshot
            .records
            .into_iter()
            .map(|r| (r.url.clone(), r))
            .collect::<HashMap<_, _>>();

        ::log::info!(
            "Opened store {} with {} records",
            path.display(),
            records.len()
        );

        Ok(Self {
            path,
            state: RwLock::new(State { records, next_id }),
        })
    }

    /// Writes `state` to disk and installs it as the current state
    async fn commit(&self, current: &mut State, next: State) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&next.to_snapshot())?;
        write_atomic(&self.path, &bytes).await?;
        *current = next;
        Ok(())
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl Backend for FileBackend {
    async fn get(&self, url: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.state.read().await.records.get(url).cloned())
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let after = id_after(record.id)?;
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.next_id = next.next_id.max(after);
        next.records.insert(record.url.clone(), record);
        self.commit(&mut *state, next).await
    }

    async fn remove(&self, url: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.records.contains_key(url) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.records.remove(url);
        self.commit(&mut *state, next).await?;
        Ok(true)
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
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.records.clear();
        self.commit(&mut *state, next).await
    }

    async fn next_id(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id = id_after(id)?;
        Ok(id)
    }
}
