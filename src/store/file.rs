//! File-backed store: one JSON document per key under a data directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::KeyValueStore;
use crate::types::Result;

/// Durable store writing each document to `<dir>/<key>.json`.
///
/// Writes go to a temp file, are flushed and fsynced, then renamed over the
/// target so a crash at any point leaves either the old or the new document
/// in place, never a truncated one.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn atomic_write(&self, path: &Path, value: &str) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        // Persist the rename itself; best effort on platforms where
        // directories cannot be opened for sync.
        if let Ok(parent) = fs::File::open(&self.dir) {
            let _ = parent.sync_all();
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read local document, treating as absent");
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.atomic_write(&self.path_for(key), value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.put("offline_cache", "{\"version\":1}").unwrap();
        assert_eq!(store.get("offline_cache").unwrap(), "{\"version\":1}");
    }

    #[test]
    fn test_get_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.put("data_mode", "online").unwrap();
        store.delete("data_mode").unwrap();
        store.delete("data_mode").unwrap();
        assert!(store.get("data_mode").is_none());
    }

    #[test]
    fn test_leftover_tmp_file_does_not_shadow_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.put("offline_cache", "{\"version\":1}").unwrap();
        // Simulate a crash that left a partial temp file behind.
        fs::write(dir.path().join("offline_cache.json.tmp"), "{\"vers").unwrap();

        assert_eq!(store.get("offline_cache").unwrap(), "{\"version\":1}");
    }

    #[test]
    fn test_put_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.put("offline_cache", "first").unwrap();
        store.put("offline_cache", "second").unwrap();
        assert_eq!(store.get("offline_cache").unwrap(), "second");
    }
}
