// Key-value store and credential store tests: SQLite get/set, JSON mapping load/save

mod common;

use common::MemoryKvStore;
use std::sync::Arc;
use tempfile::TempDir;
use wifi_scanner::store::{CREDENTIALS_KEY, CredentialMap, CredentialStore, KeyValueStore, SqliteKvStore};

async fn sqlite_store(dir: &TempDir) -> SqliteKvStore {
    let path = dir.path().join("nested").join("kv.db");
    let store = SqliteKvStore::connect(path.to_str().unwrap(), 2).await.unwrap();
    store.init().await.unwrap();
    store
}

#[tokio::test]
async fn sqlite_init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir).await;
    store.init().await.unwrap();
}

#[tokio::test]
async fn sqlite_get_missing_key_is_none() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir).await;
    assert_eq!(store.get("absent").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_set_overwrites_previous_value() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir).await;
    store.set("k", "one").await.unwrap();
    store.set("k", "two").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
}

#[tokio::test]
async fn sqlite_values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = sqlite_store(&dir).await;
        store.set(CREDENTIALS_KEY, r#"{"Home":"pw"}"#).await.unwrap();
    }
    let store = sqlite_store(&dir).await;
    let creds = CredentialStore::new(Arc::new(store));
    let loaded = creds.load().await;
    assert_eq!(loaded.get("Home").map(String::as_str), Some("pw"));
}

#[tokio::test]
async fn credentials_load_empty_when_absent() {
    let creds = CredentialStore::new(Arc::new(MemoryKvStore::new()));
    assert!(creds.load().await.is_empty());
}

#[tokio::test]
async fn credentials_load_empty_when_malformed() {
    let kv = MemoryKvStore::with_value(CREDENTIALS_KEY, "{not json");
    let creds = CredentialStore::new(Arc::new(kv));
    assert!(creds.load().await.is_empty());
}

#[tokio::test]
async fn credentials_load_empty_when_wrong_shape() {
    let kv = MemoryKvStore::with_value(CREDENTIALS_KEY, r#"["a","b"]"#);
    let creds = CredentialStore::new(Arc::new(kv));
    assert!(creds.load().await.is_empty());
}

#[tokio::test]
async fn credentials_save_writes_json_object_under_fixed_key() {
    let kv = Arc::new(MemoryKvStore::new());
    let creds = CredentialStore::new(kv.clone());
    let mut map = CredentialMap::new();
    map.insert("RaspberryAP".into(), "rasp1234".into());
    creds.save(&map).await.unwrap();

    let raw = kv.raw(CREDENTIALS_KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["RaspberryAP"], "rasp1234");
    assert_eq!(creds.load().await, map);
}

#[tokio::test]
async fn credentials_save_surfaces_persistence_error() {
    let creds = CredentialStore::new(Arc::new(MemoryKvStore::failing_writes()));
    let err = creds.save(&CredentialMap::new()).await.unwrap_err();
    assert!(err.to_string().contains("unavailable"));
}
