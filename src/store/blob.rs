// src/store/blob.rs

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Io(String),
    InvalidKey(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "I/O error: {msg}"),
            StoreError::InvalidKey(msg) => write!(f, "Invalid key: {msg}"),
        }
    }
}

impl Error for StoreError {}

/// A listed object and the metadata the ingestion pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// The narrow key-value surface the core is allowed to assume of object
/// storage. No read-modify-write transaction primitive; last writer wins.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// Every object whose key starts with `prefix`, ordered by key.
    fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StoreError>;
    fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

pub fn get_json(store: &dyn BlobStore, key: &str) -> Result<Option<Map<String, Value>>, StoreError> {
    let Some(bytes) = store.get(key)? else {
        return Ok(None);
    };
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::Io(format!("bad JSON at {key}: {e}")))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        other => Err(StoreError::Io(format!(
            "expected JSON object at {key}, got {other}"
        ))),
    }
}

pub fn put_json(store: &dyn BlobStore, key: &str, doc: &Map<String, Value>) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(&Value::Object(doc.clone()))
        .map_err(|e| StoreError::Io(format!("serialize {key}: {e}")))?;
    store.put(key, &body)
}
