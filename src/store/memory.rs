// src/store/memory.rs

use super::blob::{BlobStore, ObjectInfo, StoreError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory blob store. Used by the test suite so ingestion runs can be
/// exercised end to end without touching the filesystem.
#[derive(Default)]
pub struct MemStore {
    objects: Mutex<BTreeMap<String, (Vec<u8>, DateTime<Utc>)>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit timestamp, for newest-source tests.
    pub fn put_at(&self, key: &str, bytes: &[u8], at: DateTime<Utc>) {
        self.objects
            .lock()
            .expect("store lock")
            .insert(key.to_string(), (bytes.to_vec(), at));
    }
}

impl BlobStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let objects = self.objects.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;
        Ok(objects.get(key).map(|(bytes, _)| bytes.clone()))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;
        objects.insert(key.to_string(), (bytes.to_vec(), Utc::now()));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;
        objects.remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StoreError> {
        let objects = self.objects.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, (_, at))| ObjectInfo {
                key: k.clone(),
                last_modified: *at,
            })
            .collect())
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let objects = self.objects.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;
        Ok(objects.contains_key(key))
    }
}
