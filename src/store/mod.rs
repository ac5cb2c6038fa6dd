//! Durable local key-value store backing the offline cache, update queue
//! and data-mode flag.
//!
//! Each key maps to one whole JSON document; writes replace the document
//! atomically so a crash mid-write leaves the previous value intact. Reads
//! of absent or unreadable documents yield `None`, never an error.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::types::Result;

/// Document keys used by the sync core.
pub mod keys {
    /// Snapshot of the last known-good server state.
    pub const OFFLINE_CACHE: &str = "offline_cache";
    /// Pending per-indicator field edits awaiting replay.
    pub const UPDATE_QUEUE: &str = "indicator_update_queue";
    /// `online`/`offline` flag for unauthenticated sessions.
    pub const DATA_MODE: &str = "data_mode";
}

/// Whole-document key-value store.
///
/// Mutations must persist before returning and must be atomic with respect
/// to process crash. Reads swallow failures: a document that cannot be
/// read back is indistinguishable from one that was never written.
pub trait KeyValueStore: Send + Sync {
    /// Read a document, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Replace a document atomically.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a document. Removing an absent document is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}
