use crate::results::Record;
use crate::store::{ContentStore, StoreError};
use std::path::Path;

/// File name used when no export path is given
pub const DEFAULT_EXPORT_FILE: &str = "scraped-content.json";

/// Serializes records as a pretty-printed JSON array
pub fn to_json(records: &[Record]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Writes the store's current contents to `path`, returning the number of records written
pub async fn write_snapshot(store: &ContentStore, path: impl AsRef<Path>) -> Result<usize, StoreError> {
    let records = store.all().await?;
    let json = to_json(&records)?;
    tokio::fs::write(path.as_ref(), json).await?;
    ::log::info!(
        "Exported {} records to {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::NewItem;
    use serde_json::Value;

    #[tokio::test]
    async fn test_snapshot_shape() {
        let store = ContentStore::in_memory();
        store
            .append_or_create("http://a.com", vec![NewItem::new("<b>x</b>", "x")])
            .await
            .unwrap();

        let json = to_json(&store.all().await.unwrap()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let record = &value[0];
        assert_eq!(record["url"], "http://a.com");
        assert!(record["timestamp"].is_string());
        assert_eq!(record["content"][0]["content"], "<b>x</b>");
        assert_eq!(record["content"][0]["text"], "x");
        assert!(record["content"][0]["timestamp"].is_string());

        let back: Vec<Record> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store.all().await.unwrap());
    }

    #[tokio::test]
    async fn test_write_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        let store = ContentStore::in_memory();
        store
            .append_or_create("a", vec![NewItem::new("1", "1")])
            .await
            .unwrap();
        store
            .append_or_create("b", vec![NewItem::new("2", "2")])
            .await
            .unwrap();

        assert_eq!(write_snapshot(&store, &path).await.unwrap(), 2);
        let written: Vec<Record> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].url, "b");
    }
}
