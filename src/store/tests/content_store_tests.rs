use crate::ident;
use crate::results::NewItem;
use crate::store::{ContentStore, StoreError};

fn items(texts: &[&str]) -> Vec<NewItem> {
    texts
        .iter()
        .map(|t| NewItem::new(format!("<p>{}</p>", t), *t))
        .collect()
}

#[tokio::test]
async fn test_add_creates_single_record() {
    let store = ContentStore::in_memory();
    let id = store
        .append_or_create("http://a.com", items(&["one", "two"]))
        .await
        .unwrap();

    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].url, "http://a.com");
    assert_eq!(all[0].texts(), vec!["one", "two"]);
    assert_eq!(all[0].content[0].content, "<p>one</p>");
}

#[tokio::test]
async fn test_repeated_add_appends() {
    let store = ContentStore::in_memory();
    let first = store
        .append_or_create("http://a.com", items(&["a", "b"]))
        .await
        .unwrap();
    let second = store
        .append_or_create("http://a.com", items(&["c"]))
        .await
        .unwrap();

    assert_eq!(first, second);
    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].texts(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_identical_content_is_not_deduplicated() {
    let store = ContentStore::in_memory();
    store.append_or_create("u", items(&["same"])).await.unwrap();
    store.append_or_create("u", items(&["same"])).await.unwrap();
    assert_eq!(store.get("u").await.unwrap().unwrap().content.len(), 2);
}

#[tokio::test]
async fn test_distinct_urls_get_distinct_ids() {
    let store = ContentStore::in_memory();
    let a = store.append_or_create("a", items(&["x"])).await.unwrap();
    let b = store.append_or_create("b", items(&["y"])).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_add_rejects_empty_input() {
    let store = ContentStore::in_memory();
    assert!(matches!(
        store.append_or_create("", items(&["x"])).await,
        Err(StoreError::InvalidInput(_))
    ));
    assert!(matches!(
        store.append_or_create("http://a.com", Vec::new()).await,
        Err(StoreError::InvalidInput(_))
    ));
    assert!(matches!(
        store
            .append_or_create("http://a.com", vec![NewItem::new("", "")])
            .await,
        Err(StoreError::InvalidInput(_))
    ));
    assert!(store.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_items_are_skipped() {
    let store = ContentStore::in_memory();
    store
        .append_or_create("u", vec![NewItem::new("", ""), NewItem::new("<i>x</i>", "x")])
        .await
        .unwrap();
    assert_eq!(store.get("u").await.unwrap().unwrap().texts(), vec!["x"]);
}

#[tokio::test]
async fn test_all_orders_by_last_mutation() {
    let store = ContentStore::in_memory();
    store.append_or_create("first", items(&["1"])).await.unwrap();
    store.append_or_create("second", items(&["2"])).await.unwrap();
    store.append_or_create("third", items(&["3"])).await.unwrap();

    let urls = |records: Vec<crate::results::Record>| {
        records.into_iter().map(|r| r.url).collect::<Vec<_>>()
    };
    assert_eq!(urls(store.all().await.unwrap()), vec!["third", "second", "first"]);

    // touching the oldest record moves it to the front
    store
        .update_item(&ident::encode("first", 0), "<b>1</b>")
        .await
        .unwrap();
    assert_eq!(urls(store.all().await.unwrap()), vec!["first", "third", "second"]);
}

#[tokio::test]
async fn test_update_replaces_content_only() {
    let store = ContentStore::in_memory();
    store
        .append_or_create("http://a.com/x-1", items(&["a", "b"]))
        .await
        .unwrap();
    let before = store.get("http://a.com/x-1").await.unwrap().unwrap();

    store
        .update_item(&ident::encode("http://a.com/x-1", 1), "edited")
        .await
        .unwrap();

    let after = store.get("http://a.com/x-1").await.unwrap().unwrap();
    assert_eq!(after.content[0], before.content[0]);
    assert_eq!(after.content[1].content, "edited");
    assert_eq!(after.content[1].text, "b");
    assert!(after.timestamp > before.timestamp);
}

#[tokio::test]
async fn test_update_out_of_range_leaves_state() {
    let store = ContentStore::in_memory();
    store.append_or_create("u", items(&["a", "b"])).await.unwrap();
    let before = store.all().await.unwrap();

    let err = store
        .update_item(&ident::encode("u", 2), "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::IndexOutOfRange { index: 2, len: 2 }));
    assert_eq!(store.all().await.unwrap(), before);
}

#[tokio::test]
async fn test_update_missing_record() {
    let store = ContentStore::in_memory();
    let err = store
        .update_item(&ident::encode("http://nowhere", 0), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref url) if url == "http://nowhere"));
}

#[tokio::test]
async fn test_update_rejects_emptying_text_less_item() {
    let store = ContentStore::in_memory();
    store
        .append_or_create("u", vec![NewItem::new("<img src=\"a.png\">", "")])
        .await
        .unwrap();
    let err = store.update_item(&ident::encode("u", 0), "").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[tokio::test]
async fn test_malformed_identifier() {
    let store = ContentStore::in_memory();
    store.append_or_create("u", items(&["a"])).await.unwrap();
    assert!(matches!(
        store.delete_item("u").await,
        Err(StoreError::MalformedIdentifier(_))
    ));
    assert!(matches!(
        store.update_item("u-item-x", "y").await,
        Err(StoreError::MalformedIdentifier(_))
    ));
}

#[tokio::test]
async fn test_delete_shifts_later_items() {
    let store = ContentStore::in_memory();
    store
        .append_or_create("u", items(&["a", "b", "c"]))
        .await
        .unwrap();

    store.delete_item(&ident::encode("u", 1)).await.unwrap();

    let record = store.get("u").await.unwrap().unwrap();
    assert_eq!(record.texts(), vec!["a", "c"]);
}

#[tokio::test]
async fn test_delete_last_item_removes_record() {
    let store = ContentStore::in_memory();
    store
        .append_or_create("http://a.com/x-1", items(&["only"]))
        .await
        .unwrap();
    store.append_or_create("other", items(&["keep"])).await.unwrap();

    store
        .delete_item(&ident::encode("http://a.com/x-1", 0))
        .await
        .unwrap();

    assert!(store.get("http://a.com/x-1").await.unwrap().is_none());
    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].url, "other");

    // the id now points at nothing
    assert!(matches!(
        store.delete_item(&ident::encode("http://a.com/x-1", 0)).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let store = ContentStore::in_memory();
    store.append_or_create("a", items(&["1"])).await.unwrap();
    store.append_or_create("b", items(&["2"])).await.unwrap();

    store.clear().await.unwrap();
    assert!(store.all().await.unwrap().is_empty());
    store.clear().await.unwrap();
    assert!(store.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_entries_flatten_with_ids() {
    let store = ContentStore::in_memory();
    store.append_or_create("old-site", items(&["x"])).await.unwrap();
    store
        .append_or_create("http://new-site.com", items(&["y", "z"]))
        .await
        .unwrap();

    let entries = store.entries().await.unwrap();
    let ids = entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            "http://new-site.com-item-0",
            "http://new-site.com-item-1",
            "old-site-item-0"
        ]
    );
    assert_eq!(entries[1].item.text, "z");

    // every issued id resolves back to its own item
    store.delete_item(&entries[2].id).await.unwrap();
    assert!(store.get("old-site").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_appends_to_same_url_all_land() {
    let store = ContentStore::in_memory();
    let mut handles = Vec::new();
    for n in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let text = n.to_string();
            store
                .append_or_create("http://race.com", items(&[text.as_str()]))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let record = store.get("http://race.com").await.unwrap().unwrap();
    assert_eq!(record.content.len(), 16);
    let all = store.all().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_put_with_max_id_is_rejected() {
    use crate::results::{ContentItem, Record};
    use crate::store::{Backend, MemoryBackend};

    let backend = MemoryBackend::new();
    let record = Record::new(
        u64::MAX,
        "http://a.com".to_string(),
        vec![ContentItem::new("x".into(), "x".into(), "t".into())],
        chrono::Utc::now(),
    );
    assert!(matches!(
        backend.put(record).await,
        Err(StoreError::InvalidInput(_))
    ));
    assert!(backend.scan().await.unwrap().is_empty());
}
