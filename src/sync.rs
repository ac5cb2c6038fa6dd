//! Sync reconciliation: replay the update queue against the server.
//!
//! All queued items are dispatched concurrently and joined with an
//! all-settled barrier; one item's failure never aborts or rolls back the
//! others. Succeeded entries leave the queue, failed entries stay queued
//! with their reason recorded for display and later retry. Partial success
//! is the expected steady state under intermittent connectivity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::IndicatorApi;
use crate::queue::UpdateQueue;
use crate::types::Result;

/// Per-item state during one reconciliation run. Ephemeral: exists only
/// for the duration of the run and its UI display, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemState {
    Pending,
    Syncing,
    Success,
    Failed(String),
}

/// One item that could not be replayed.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub indicator_id: String,
    pub reason: String,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub succeeded: Vec<String>,
    pub failed: Vec<SyncFailure>,
    /// Entries still queued after the run (failed items plus anything
    /// enqueued mid-run).
    pub remaining: usize,
}

impl SyncReport {
    /// Nothing left queued: the caller should refresh from the live server
    /// and trust its state again.
    pub fn queue_drained(&self) -> bool {
        self.remaining == 0
    }
}

/// Replays queued edits via the per-indicator update endpoint.
pub struct SyncReconciler {
    api: Arc<dyn IndicatorApi>,
    queue: UpdateQueue,
    progress: Arc<Mutex<HashMap<String, ItemState>>>,
}

impl SyncReconciler {
    pub fn new(api: Arc<dyn IndicatorApi>, queue: UpdateQueue) -> Self {
        Self {
            api,
            queue,
            progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Snapshot of per-item states for the run in flight (or the last
    /// completed run).
    pub fn progress(&self) -> HashMap<String, ItemState> {
        self.progress
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn set_state(&self, indicator_id: &str, state: ItemState) {
        let mut progress = self.progress.lock().unwrap_or_else(|p| p.into_inner());
        progress.insert(indicator_id.to_string(), state);
    }

    /// Replay every queued item concurrently; wait for all to settle.
    ///
    /// The update endpoint is idempotent, so an item that succeeded on the
    /// server but failed to be confirmed here is harmless to replay again.
    pub async fn sync_all(&self) -> SyncReport {
        let updates: Vec<_> = self.queue.get_all().into_values().collect();
        let run_id = Uuid::new_v4();
        info!(%run_id, items = updates.len(), "starting sync run");

        {
            let mut progress = self.progress.lock().unwrap_or_else(|p| p.into_inner());
            progress.clear();
            for update in &updates {
                progress.insert(update.indicator_id.clone(), ItemState::Pending);
            }
        }

        // Fan out one request per item; collect every outcome.
        let dispatches = updates.into_iter().map(|update| {
            let api = Arc::clone(&self.api);
            self.set_state(&update.indicator_id, ItemState::Syncing);
            async move {
                let patch = update.fields.to_patch();
                let outcome = api
                    .update_indicator(&update.indicator_id, &patch)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                (update.indicator_id, outcome)
            }
        });
        let settled = future::join_all(dispatches).await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (indicator_id, outcome) in settled {
            match outcome {
                Ok(()) => {
                    if let Err(e) = self.queue.remove(&indicator_id) {
                        warn!(indicator_id = %indicator_id, error = %e, "synced item could not be removed from queue");
                    }
                    self.set_state(&indicator_id, ItemState::Success);
                    succeeded.push(indicator_id);
                }
                Err(reason) => {
                    self.set_state(&indicator_id, ItemState::Failed(reason.clone()));
                    failed.push(SyncFailure {
                        indicator_id,
                        reason,
                    });
                }
            }
        }

        let remaining = self.queue.count();
        info!(
            %run_id,
            succeeded = succeeded.len(),
            failed = failed.len(),
            remaining,
            "sync run complete"
        );
        SyncReport {
            run_id,
            succeeded,
            failed,
            remaining,
        }
    }

    /// Abandon every queued edit without any network call. Irreversible
    /// and deliberately distinct from syncing.
    pub fn discard_all(&self) -> Result<()> {
        let discarded = self.queue.count();
        self.queue.clear()?;
        self.progress
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
        info!(discarded, "queued updates discarded");
        Ok(())
    }
}
