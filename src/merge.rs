//! Merged read view: cached server state overlaid with queued edits.
//!
//! Answers "what does the user see right now" without contacting the
//! server. Depends on both the cache and the queue so that neither has to
//! depend on the other.

use crate::cache::{CachedIndicator, OfflineCache};
use crate::model::{Indicator, Project};
use crate::queue::{QueuedUpdate, UpdateQueue};

/// Read-only view combining the offline cache with the update queue.
#[derive(Clone)]
pub struct MergedReadView {
    cache: OfflineCache,
    queue: UpdateQueue,
}

impl MergedReadView {
    pub fn new(cache: OfflineCache, queue: UpdateQueue) -> Self {
        Self { cache, queue }
    }

    /// Projects as the user should see them offline: cached fields with any
    /// queued edit overlaid field-by-field.
    ///
    /// Evidence lists are always empty here - the cache never stores
    /// evidence bodies, and the UI surfaces that limitation rather than
    /// hiding it.
    pub fn projects(&self) -> Vec<Project> {
        let Some(snapshot) = self.cache.read() else {
            return Vec::new();
        };
        let pending = self.queue.get_all();
        let snapshot_time = snapshot.timestamp;

        snapshot
            .projects
            .into_iter()
            .map(|project| Project {
                id: project.id,
                name: project.name,
                description: project.description,
                // The cache timestamp stands in for the project's own
                // creation time, which the snapshot does not carry.
                created_at: snapshot_time,
                indicators: project
                    .indicators
                    .into_iter()
                    .map(|indicator| {
                        let update = pending.get(&indicator.id);
                        overlay(indicator, update)
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Overlay a queued edit on a cached indicator, independently per field.
fn overlay(cached: CachedIndicator, update: Option<&QueuedUpdate>) -> Indicator {
    Indicator {
        id: cached.id,
        section: cached.section,
        standard: cached.standard,
        indicator: cached.indicator,
        description: cached.description,
        score: update
            .and_then(|u| u.fields.score)
            .unwrap_or(cached.score),
        status: update
            .and_then(|u| u.fields.status)
            .unwrap_or(cached.status),
        notes: update
            .and_then(|u| u.fields.notes.clone())
            .or(cached.notes),
        evidence: Vec::new(),
        evidence_state: None,
        frequency: None,
        last_updated: update.map(|u| u.updated_at).or(cached.last_updated),
    }
}
