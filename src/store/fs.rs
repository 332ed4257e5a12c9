// src/store/fs.rs

use super::blob::{BlobStore, ObjectInfo, StoreError};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Blob store backed by a directory tree: object keys map to relative paths
/// under the root. Stands in for the production object store, which exposes
/// the same get/put/delete/list surface.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        if key.split('/').any(|seg| seg == "..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    fn walk(&self, dir: &Path, out: &mut Vec<ObjectInfo>) -> Result<(), StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return Ok(()), // missing directory is just an empty listing
        };
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io(e.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, out)?;
            } else {
                let rel = path
                    .strip_prefix(&self.root)
                    .map_err(|e| StoreError::Io(e.to_string()))?;
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let meta = entry.metadata().map_err(|e| StoreError::Io(e.to_string()))?;
                let modified = meta.modified().map_err(|e| StoreError::Io(e.to_string()))?;
                out.push(ObjectInfo {
                    key,
                    last_modified: DateTime::<Utc>::from(modified),
                });
            }
        }
        Ok(())
    }
}

impl BlobStore for FsStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(format!("read {key}: {e}"))),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(format!("mkdir {key}: {e}")))?;
        }
        fs::write(&path, bytes).map_err(|e| StoreError::Io(format!("write {key}: {e}")))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(format!("delete {key}: {e}"))),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StoreError> {
        let mut out = Vec::new();
        self.walk(&self.root, &mut out)?;
        out.retain(|o| o.key.starts_with(prefix));
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(key)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_lists_by_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsStore::new(dir.path());

        store.put("csv-incoming/a.csv", b"one").unwrap();
        store.put("photos/123/main.jpg", b"img").unwrap();

        assert_eq!(store.get("csv-incoming/a.csv").unwrap(), Some(b"one".to_vec()));
        assert!(store.exists("photos/123/main.jpg").unwrap());
        assert_eq!(store.get("missing").unwrap(), None);

        let listed = store.list("csv-incoming/").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "csv-incoming/a.csv");

        store.delete("csv-incoming/a.csv").unwrap();
        assert!(!store.exists("csv-incoming/a.csv").unwrap());
        // deleting again is a no-op
        store.delete("csv-incoming/a.csv").unwrap();
    }

    #[test]
    fn rejects_traversal_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsStore::new(dir.path());
        assert!(store.get("../outside").is_err());
        assert!(store.put("/absolute", b"x").is_err());
    }
}
