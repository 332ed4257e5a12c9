use crate::store::{BlobStore, MemStore, ObjectInfo, StoreError};
use serde_json::{Map, Value};

/// Store seeded with one incoming CSV, ready for an ingestion run.
pub fn store_with_csv(csv: &str) -> MemStore {
    let store = MemStore::new();
    store
        .put("csv-incoming/feed.csv", csv.as_bytes())
        .expect("seed csv");
    store
}

/// In-memory store that fails writes or deletes against chosen keys, for
/// exercising the row-error and orphaned-source paths.
pub struct FailingStore {
    inner: MemStore,
    fail_put_for: Vec<String>,
    fail_delete_for: Vec<String>,
}

impl FailingStore {
    pub fn new(fail_put_for: &[&str], fail_delete_for: &[&str]) -> Self {
        Self {
            inner: MemStore::new(),
            fail_put_for: fail_put_for.iter().map(|s| s.to_string()).collect(),
            fail_delete_for: fail_delete_for.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BlobStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if self.fail_put_for.iter().any(|k| k == key) {
            return Err(StoreError::Io(format!("injected write failure: {key}")));
        }
        self.inner.put(key, bytes)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_delete_for.iter().any(|k| k == key) {
            return Err(StoreError::Io(format!("injected delete failure: {key}")));
        }
        self.inner.delete(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StoreError> {
        self.inner.list(prefix)
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key)
    }
}

pub fn read_details(store: &MemStore, listing_id: &str) -> Map<String, Value> {
    let key = format!("listings/{listing_id}/details.json");
    let bytes = store
        .get(&key)
        .expect("read details")
        .unwrap_or_else(|| panic!("missing document: {key}"));
    match serde_json::from_slice(&bytes).expect("details parse") {
        Value::Object(map) => map,
        other => panic!("expected object at {key}, got {other}"),
    }
}
