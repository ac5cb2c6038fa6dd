//! In-memory store for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use super::KeyValueStore;
use crate::types::Result;

/// Non-durable store keeping documents in a map.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let documents = self.documents.lock().unwrap_or_else(|p| p.into_inner());
        documents.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut documents = self.documents.lock().unwrap_or_else(|p| p.into_inner());
        documents.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut documents = self.documents.lock().unwrap_or_else(|p| p.into_inner());
        documents.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("k").is_none());

        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), "v");

        store.delete("k").unwrap();
        assert!(store.get("k").is_none());
    }
}
