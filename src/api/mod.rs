//! Authenticated HTTP client for the compliance API.
//!
//! The sync core depends on two narrow seams abstracted here: the
//! per-indicator update endpoint (replayed by the reconciler, idempotent on
//! the server side) and a cheap authenticated probe endpoint used for
//! reachability detection. `ApiClient` implements both against the live
//! server; tests substitute their own implementations.

mod client;
pub mod wire;

pub use client::ApiClient;
pub use wire::{ApiErrorBody, UpcomingBuckets};

use async_trait::async_trait;

use crate::model::{Indicator, IndicatorPatch};
use crate::types::Result;

/// Per-indicator mutation endpoint consumed by the sync reconciler.
#[async_trait]
pub trait IndicatorApi: Send + Sync {
    /// Apply a partial field set to one indicator and return the updated
    /// indicator. Replaying the same fields twice is harmless.
    async fn update_indicator(&self, id: &str, patch: &IndicatorPatch) -> Result<Indicator>;
}

/// Reachability probe consumed by the connectivity monitor.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Probe the server within a bounded timeout.
    ///
    /// `Some(true)` when the server process answered (any HTTP status below
    /// 500, 401 included - a stale credential still proves the network path
    /// works), `Some(false)` on transport failure or timeout, `None` when no
    /// credential is held and the check cannot be made at all.
    async fn probe(&self) -> Option<bool>;
}
