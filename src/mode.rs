//! Data mode: whether reads are answered by the live API or local data.
//!
//! Authenticated sessions are always online - the flag cannot override
//! that. Unauthenticated sessions default to offline (demo mode) and may
//! toggle explicitly; the preference persists across restarts.

use std::sync::Arc;

use crate::store::{keys, KeyValueStore};
use crate::types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Online,
    Offline,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Online => "online",
            DataMode::Offline => "offline",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "online" => Some(DataMode::Online),
            "offline" => Some(DataMode::Offline),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted data-mode preference.
#[derive(Clone)]
pub struct DataModeStore {
    store: Arc<dyn KeyValueStore>,
}

impl DataModeStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Effective mode: online when authenticated, otherwise the stored
    /// preference (unrecognized or absent values default to offline).
    pub fn get(&self, is_authenticated: bool) -> DataMode {
        if is_authenticated {
            return DataMode::Online;
        }
        self.store
            .get(keys::DATA_MODE)
            .as_deref()
            .and_then(DataMode::parse)
            .unwrap_or(DataMode::Offline)
    }

    /// Store a preference; returns the mode actually in effect, which is
    /// forced to online while authenticated.
    pub fn set(&self, mode: DataMode, is_authenticated: bool) -> Result<DataMode> {
        let effective = if is_authenticated {
            DataMode::Online
        } else {
            mode
        };
        self.store.put(keys::DATA_MODE, effective.as_str())?;
        Ok(effective)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.delete(keys::DATA_MODE)
    }

    /// Whether reads should hit the live API rather than local data.
    pub fn use_live_api(&self, is_authenticated: bool) -> bool {
        self.get(is_authenticated) == DataMode::Online
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> DataModeStore {
        DataModeStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_authenticated_is_always_online() {
        let modes = store();
        assert_eq!(modes.get(true), DataMode::Online);

        // Even an explicit offline preference is overridden.
        let effective = modes.set(DataMode::Offline, true).unwrap();
        assert_eq!(effective, DataMode::Online);
        assert_eq!(modes.get(true), DataMode::Online);
        assert!(modes.use_live_api(true));
    }

    #[test]
    fn test_unauthenticated_defaults_to_offline() {
        let modes = store();
        assert_eq!(modes.get(false), DataMode::Offline);
        assert!(!modes.use_live_api(false));
    }

    #[test]
    fn test_unauthenticated_preference_persists() {
        let modes = store();
        modes.set(DataMode::Online, false).unwrap();
        assert_eq!(modes.get(false), DataMode::Online);

        modes.clear().unwrap();
        assert_eq!(modes.get(false), DataMode::Offline);
    }

    #[test]
    fn test_garbage_flag_reads_as_default() {
        let raw = Arc::new(MemoryStore::new());
        raw.put(keys::DATA_MODE, "maybe?").unwrap();
        let modes = DataModeStore::new(raw);
        assert_eq!(modes.get(false), DataMode::Offline);
    }
}
