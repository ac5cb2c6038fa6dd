//! Accredify Sync - offline-first synchronization core for the Accredify
//! compliance tracker.
//!
//! Lets a client keep working while its server is unreachable: edits are
//! staged in a durable update queue, reads are answered from a cached
//! snapshot overlaid with the queued edits, and a reconciler replays the
//! queue against the server once reachability returns.
//!
//! ## Services
//!
//! - **Connectivity**: polls an authenticated endpoint and broadcasts
//!   reachability transitions to subscribers
//! - **Cache**: durable lossy snapshot of the last known-good server state
//! - **Queue**: durable per-indicator staging of offline field edits
//! - **Merge**: cache ⊕ queue read view answered without the server
//! - **Sync**: concurrent replay of queued edits with per-item outcomes
//! - **Evidence**: advisory gate for "mark compliant" transitions

pub mod api;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod evidence;
pub mod merge;
pub mod mode;
pub mod model;
pub mod queue;
pub mod session;
pub mod store;
pub mod sync;
pub mod types;

pub use config::Args;
pub use session::SyncSession;
pub use types::{Result, SyncError};
