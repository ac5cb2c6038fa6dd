//! Composition root wiring the sync services together.
//!
//! One `SyncSession` is constructed at process start and passed by
//! reference to consumers; all mutable connectivity state lives inside it
//! rather than in module-level globals.

use std::sync::Arc;

use tracing::info;

use crate::api::{ApiClient, IndicatorApi, ReachabilityProbe};
use crate::cache::OfflineCache;
use crate::config::Args;
use crate::connectivity::ConnectivityMonitor;
use crate::merge::MergedReadView;
use crate::mode::DataModeStore;
use crate::queue::UpdateQueue;
use crate::store::{FileStore, KeyValueStore};
use crate::sync::SyncReconciler;
use crate::types::Result;

/// One client session: API access, durable local state and the services
/// built over them.
pub struct SyncSession {
    api: Arc<ApiClient>,
    cache: OfflineCache,
    queue: UpdateQueue,
    merged: MergedReadView,
    mode: DataModeStore,
    monitor: ConnectivityMonitor,
    reconciler: SyncReconciler,
}

impl SyncSession {
    /// Wire up a session against a file-backed store in the configured
    /// data directory.
    pub fn new(args: &Args) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&args.data_dir)?);
        Self::with_store(args, store)
    }

    /// Wire up a session over any store (tests use a memory store).
    pub fn with_store(args: &Args, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let api = Arc::new(ApiClient::new(
            &args.api_url,
            args.request_timeout(),
            args.probe_timeout(),
        )?);
        if let Some(token) = &args.token {
            api.set_token(token);
        }

        let cache = OfflineCache::new(Arc::clone(&store));
        let queue = UpdateQueue::new(Arc::clone(&store));
        let merged = MergedReadView::new(cache.clone(), queue.clone());
        let mode = DataModeStore::new(store);
        let monitor = ConnectivityMonitor::new(
            Arc::clone(&api) as Arc<dyn ReachabilityProbe>,
            args.check_interval(),
        );
        let reconciler = SyncReconciler::new(
            Arc::clone(&api) as Arc<dyn IndicatorApi>,
            queue.clone(),
        );

        Ok(Self {
            api,
            cache,
            queue,
            merged,
            mode,
            monitor,
            reconciler,
        })
    }

    /// Fetch the authoritative project listing and rewrite the offline
    /// snapshot. Returns the number of projects cached.
    pub async fn refresh_cache(&self) -> Result<usize> {
        let projects = self.api.fetch_projects().await?;
        self.cache.write(&projects)?;
        info!(projects = projects.len(), "offline snapshot refreshed from server");
        Ok(projects.len())
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn cache(&self) -> &OfflineCache {
        &self.cache
    }

    pub fn queue(&self) -> &UpdateQueue {
        &self.queue
    }

    pub fn merged(&self) -> &MergedReadView {
        &self.merged
    }

    pub fn mode(&self) -> &DataModeStore {
        &self.mode
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    pub fn reconciler(&self) -> &SyncReconciler {
        &self.reconciler
    }

    /// Stop background work. Safe to call more than once.
    pub fn shutdown(&self) {
        self.monitor.stop();
    }
}
