//! Durable queue of offline indicator edits.
//!
//! Keyed by indicator id: at most one pending edit per indicator. A new
//! edit replaces the previous entry's fields wholesale (latest write wins,
//! no field-level merge) - the UI always stages every edited field for
//! status-changing operations, so the newest field set fully defines what
//! will be sent. Every mutation persists before returning.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{ComplianceStatus, IndicatorPatch};
use crate::store::{keys, KeyValueStore};
use crate::types::Result;

/// Current queue document version.
pub const QUEUE_VERSION: u32 = 1;

/// Marker recorded on every queued entry.
const SOURCE_OFFLINE: &str = "offline";

/// Allow-listed field subset an offline edit may stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplianceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateFields {
    /// Extract the allow-listed fields from a patch; anything else the
    /// patch carried is silently dropped.
    pub fn from_patch(patch: &IndicatorPatch) -> Self {
        Self {
            status: patch.status,
            score: patch.score,
            notes: patch.notes.clone(),
        }
    }

    /// Payload to send when replaying this entry against the server.
    pub fn to_patch(&self) -> IndicatorPatch {
        IndicatorPatch {
            status: self.status,
            score: self.score,
            notes: self.notes.clone(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.score.is_none() && self.notes.is_none()
    }
}

/// One staged, not-yet-confirmed edit to one indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedUpdate {
    pub indicator_id: String,
    pub fields: UpdateFields,
    pub updated_at: DateTime<Utc>,
    pub source: String,
}

/// Persisted queue document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QueueDocument {
    version: u32,
    updated_at: DateTime<Utc>,
    updates: BTreeMap<String, QueuedUpdate>,
}

impl QueueDocument {
    fn empty() -> Self {
        Self {
            version: QUEUE_VERSION,
            updated_at: Utc::now(),
            updates: BTreeMap::new(),
        }
    }
}

/// Durable update queue over the local store.
#[derive(Clone)]
pub struct UpdateQueue {
    store: Arc<dyn KeyValueStore>,
}

impl UpdateQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load(&self) -> QueueDocument {
        let Some(raw) = self.store.get(keys::UPDATE_QUEUE) else {
            return QueueDocument::empty();
        };
        match serde_json::from_str::<QueueDocument>(&raw) {
            Ok(document) if document.version >= 1 => document,
            Ok(document) => {
                warn!(version = document.version, "update queue has invalid version, starting empty");
                QueueDocument::empty()
            }
            Err(e) => {
                warn!(error = %e, "update queue unreadable, starting empty");
                QueueDocument::empty()
            }
        }
    }

    fn save(&self, mut document: QueueDocument) -> Result<()> {
        document.updated_at = Utc::now();
        let raw = serde_json::to_string(&document)?;
        self.store.put(keys::UPDATE_QUEUE, &raw)
    }

    /// Stage an offline edit. Replaces any pending entry for the same
    /// indicator wholesale: fields omitted from this edit are dropped even
    /// if a previous edit had set them.
    pub fn enqueue(&self, indicator_id: &str, patch: &IndicatorPatch) -> Result<()> {
        let fields = UpdateFields::from_patch(patch);
        let mut document = self.load();
        document.updates.insert(
            indicator_id.to_string(),
            QueuedUpdate {
                indicator_id: indicator_id.to_string(),
                fields,
                updated_at: Utc::now(),
                source: SOURCE_OFFLINE.to_string(),
            },
        );
        self.save(document)?;
        debug!(indicator_id, "offline edit queued");
        Ok(())
    }

    pub fn get(&self, indicator_id: &str) -> Option<QueuedUpdate> {
        self.load().updates.remove(indicator_id)
    }

    pub fn get_all(&self) -> BTreeMap<String, QueuedUpdate> {
        self.load().updates
    }

    /// Remove one entry, after its replay has been confirmed.
    pub fn remove(&self, indicator_id: &str) -> Result<()> {
        let mut document = self.load();
        if document.updates.remove(indicator_id).is_some() {
            self.save(document)?;
        }
        Ok(())
    }

    /// Drop the whole queue document.
    pub fn clear(&self) -> Result<()> {
        self.store.delete(keys::UPDATE_QUEUE)
    }

    pub fn count(&self) -> usize {
        self.load().updates.len()
    }

    /// Whether this indicator has a staged edit awaiting replay. Queue
    /// entries are the sole source of "is this indicator unsynced".
    pub fn has_unsynced(&self, indicator_id: &str) -> bool {
        self.load().updates.contains_key(indicator_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn queue() -> UpdateQueue {
        UpdateQueue::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_enqueue_and_get() {
        let queue = queue();
        let patch = IndicatorPatch {
            status: Some(ComplianceStatus::Compliant),
            notes: Some("done".into()),
            ..Default::default()
        };
        queue.enqueue("IND-1", &patch).unwrap();

        let entry = queue.get("IND-1").unwrap();
        assert_eq!(entry.fields.status, Some(ComplianceStatus::Compliant));
        assert_eq!(entry.fields.notes.as_deref(), Some("done"));
        assert_eq!(entry.source, "offline");
        assert_eq!(queue.count(), 1);
        assert!(queue.has_unsynced("IND-1"));
        assert!(!queue.has_unsynced("IND-2"));
    }

    #[test]
    fn test_latest_write_wins_no_merge() {
        let queue = queue();
        queue
            .enqueue(
                "IND-1",
                &IndicatorPatch {
                    status: Some(ComplianceStatus::Compliant),
                    ..Default::default()
                },
            )
            .unwrap();
        queue
            .enqueue(
                "IND-1",
                &IndicatorPatch {
                    score: Some(5),
                    ..Default::default()
                },
            )
            .unwrap();

        // The second edit's omitted fields are dropped: only score remains.
        let entry = queue.get("IND-1").unwrap();
        assert_eq!(entry.fields.score, Some(5));
        assert!(entry.fields.status.is_none());
        assert!(entry.fields.notes.is_none());
        assert_eq!(queue.count(), 1);
    }

    #[test]
    fn test_disallowed_fields_are_dropped() {
        let queue = queue();
        queue
            .enqueue(
                "IND-1",
                &IndicatorPatch {
                    score: Some(3),
                    assignee: Some("Dana".into()),
                    last_updated: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .unwrap();

        let entry = queue.get("IND-1").unwrap();
        assert_eq!(entry.fields, UpdateFields {
            score: Some(3),
            ..Default::default()
        });
        let replay = entry.fields.to_patch();
        assert!(replay.assignee.is_none());
        assert!(replay.last_updated.is_none());
    }

    #[test]
    fn test_remove_only_confirmed_entry() {
        let queue = queue();
        queue.enqueue("IND-1", &IndicatorPatch::default()).unwrap();
        queue.enqueue("IND-2", &IndicatorPatch::default()).unwrap();

        queue.remove("IND-1").unwrap();
        assert_eq!(queue.count(), 1);
        assert!(queue.get("IND-2").is_some());

        // Removing an absent entry is a no-op.
        queue.remove("IND-1").unwrap();
        assert_eq!(queue.count(), 1);
    }

    #[test]
    fn test_clear_empties_queue() {
        let queue = queue();
        queue.enqueue("IND-1", &IndicatorPatch::default()).unwrap();
        queue.clear().unwrap();
        assert_eq!(queue.count(), 0);
    }

    #[test]
    fn test_corrupt_document_reads_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.put(keys::UPDATE_QUEUE, "{\"version\":1,\"upd").unwrap();
        let queue = UpdateQueue::new(store);
        assert_eq!(queue.count(), 0);

        // A fresh enqueue recovers the document.
        queue.enqueue("IND-1", &IndicatorPatch::default()).unwrap();
        assert_eq!(queue.count(), 1);
    }
}
