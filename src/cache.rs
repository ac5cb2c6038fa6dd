//! Offline snapshot cache.
//!
//! After every successful authenticated full-project fetch the snapshot is
//! rewritten whole; when the server is unreachable it becomes the fallback
//! source of truth for reads. The projection is lossy: evidence bodies are
//! dropped and only a count is kept per indicator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{ComplianceStatus, Project};
use crate::store::{keys, KeyValueStore};
use crate::types::Result;

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted snapshot of the last known-good server state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSnapshot {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub projects: Vec<CachedProject>,
}

/// Reduced project: identity plus cached indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedProject {
    pub id: String,
    pub name: String,
    pub description: String,
    pub indicators: Vec<CachedIndicator>,
}

/// Reduced indicator: editable fields plus an evidence count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedIndicator {
    pub id: String,
    pub project_id: String,
    pub section: String,
    pub standard: String,
    pub indicator: String,
    pub description: String,
    pub score: i64,
    pub status: ComplianceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub evidence_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Durable offline cache over the local store.
#[derive(Clone)]
pub struct OfflineCache {
    store: Arc<dyn KeyValueStore>,
}

impl OfflineCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Project the given server state and replace the snapshot atomically.
    pub fn write(&self, projects: &[Project]) -> Result<()> {
        let snapshot = CachedSnapshot {
            version: SNAPSHOT_VERSION,
            timestamp: Utc::now(),
            projects: projects.iter().map(project_snapshot).collect(),
        };
        let raw = serde_json::to_string(&snapshot)?;
        self.store.put(keys::OFFLINE_CACHE, &raw)?;
        debug!(projects = snapshot.projects.len(), "offline snapshot written");
        Ok(())
    }

    /// Read the snapshot. An absent, unparseable or structurally invalid
    /// document reads as absent - never a partial object.
    pub fn read(&self) -> Option<CachedSnapshot> {
        let raw = self.store.get(keys::OFFLINE_CACHE)?;
        match serde_json::from_str::<CachedSnapshot>(&raw) {
            Ok(snapshot) if snapshot.version >= 1 => Some(snapshot),
            Ok(snapshot) => {
                warn!(version = snapshot.version, "cached snapshot has invalid version, ignoring");
                None
            }
            Err(e) => {
                warn!(error = %e, "cached snapshot unreadable, treating as absent");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.delete(keys::OFFLINE_CACHE)
    }

    /// Timestamp of the last successful snapshot, for "last synced" display.
    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.read().map(|snapshot| snapshot.timestamp)
    }
}

fn project_snapshot(project: &Project) -> CachedProject {
    CachedProject {
        id: project.id.clone(),
        name: project.name.clone(),
        description: project.description.clone(),
        indicators: project
            .indicators
            .iter()
            .map(|indicator| CachedIndicator {
                id: indicator.id.clone(),
                project_id: project.id.clone(),
                section: indicator.section.clone(),
                standard: indicator.standard.clone(),
                indicator: indicator.indicator.clone(),
                description: indicator.description.clone(),
                score: indicator.score,
                status: indicator.status,
                notes: indicator.notes.clone(),
                evidence_count: indicator.evidence.len(),
                last_updated: indicator.last_updated,
            })
            .collect(),
    }
}
