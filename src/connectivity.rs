//! Server reachability monitoring.
//!
//! Polls the authenticated probe endpoint on an interval and whenever the
//! host environment hints that the network came back. Subscribers are
//! notified on state transitions only; a newly attached subscriber is
//! invoked once immediately with the current state so it can render
//! without waiting for the next poll.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::ReachabilityProbe;

/// Interval between scheduled reachability checks.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(30);

type Callback = Box<dyn Fn(bool) + Send + Sync>;

/// Handle identifying one subscriber, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Reachability monitor owned by the composition root.
///
/// Cheap to clone; clones share the same state, subscribers and poll task.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<Inner>,
}

struct Inner {
    probe: Arc<dyn ReachabilityProbe>,
    interval: Duration,
    /// Last known reachability. Starts optimistic so the UI does not flash
    /// an offline banner before the first check completes.
    reachable: AtomicBool,
    /// Result of the most recent completed probe, for single-flight joiners.
    last_result: AtomicBool,
    subscribers: Mutex<HashMap<u64, Callback>>,
    next_subscriber_id: AtomicU64,
    /// Single-flight guard: at most one probe in flight at a time.
    probe_gate: tokio::sync::Mutex<()>,
    /// Signalled by the host environment on a network "online" event to
    /// short-circuit the next scheduled poll.
    online_hint: Notify,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    pub fn new(probe: Arc<dyn ReachabilityProbe>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                probe,
                interval,
                reachable: AtomicBool::new(true),
                last_result: AtomicBool::new(true),
                subscribers: Mutex::new(HashMap::new()),
                next_subscriber_id: AtomicU64::new(1),
                probe_gate: tokio::sync::Mutex::new(()),
                online_hint: Notify::new(),
                task: Mutex::new(None),
            }),
        }
    }

    /// Current cached reachability without issuing a probe.
    pub fn is_reachable(&self) -> bool {
        self.inner.reachable.load(Ordering::SeqCst)
    }

    /// Probe the server now.
    ///
    /// Overlapping calls collapse onto one outstanding probe: latecomers
    /// wait for the in-flight check to finish and adopt its result instead
    /// of racing a second request (and risking out-of-order notifications).
    pub async fn check_now(&self) -> bool {
        let inner = &self.inner;
        match inner.probe_gate.try_lock() {
            Ok(_guard) => match inner.probe.probe().await {
                Some(reachable) => {
                    inner.last_result.store(reachable, Ordering::SeqCst);
                    inner.apply(reachable);
                    reachable
                }
                None => {
                    // No credential held: the check cannot be made, the
                    // cached state stays untouched and nobody is notified.
                    false
                }
            },
            Err(_) => {
                let _joined = inner.probe_gate.lock().await;
                inner.last_result.load(Ordering::SeqCst)
            }
        }
    }

    /// Register a subscriber. It is invoked once immediately with the
    /// current state, then again on every state transition.
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        callback(self.is_reachable());
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        subscribers.insert(id, Box::new(callback));
        SubscriberId(id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        subscribers.remove(&id.0);
    }

    /// Signal from the host environment that the network may be back;
    /// short-circuits the next scheduled poll.
    pub fn online_hint(&self) {
        self.inner.online_hint.notify_one();
    }

    /// Start periodic checks. Idempotent: a running monitor is restarted,
    /// never doubled.
    pub fn start(&self, enabled: bool) {
        self.stop();
        if !enabled {
            return;
        }
        info!(interval_secs = self.inner.interval.as_secs(), "starting connectivity monitor");
        let monitor = self.clone();
        let handle = tokio::spawn(async move {
            // Initial check so subscribers see real state quickly.
            monitor.check_now().await;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(monitor.inner.interval) => {}
                    _ = monitor.inner.online_hint.notified() => {
                        debug!("online hint received, probing early");
                    }
                }
                monitor.check_now().await;
            }
        });
        let mut task = self.inner.task.lock().unwrap_or_else(|p| p.into_inner());
        *task = Some(handle);
    }

    /// Cancel the poll task. Safe to call when not started.
    pub fn stop(&self) {
        let handle = {
            let mut task = self.inner.task.lock().unwrap_or_else(|p| p.into_inner());
            task.take()
        };
        if let Some(handle) = handle {
            handle.abort();
            info!("connectivity monitor stopped");
        }
    }
}

impl Inner {
    /// Record a completed probe; notify subscribers only on a transition.
    fn apply(&self, reachable: bool) {
        let previous = self.reachable.swap(reachable, Ordering::SeqCst);
        if previous == reachable {
            return;
        }
        debug!(reachable, "server reachability changed");
        let subscribers = self.subscribers.lock().unwrap_or_else(|p| p.into_inner());
        for callback in subscribers.values() {
            callback(reachable);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().unwrap_or_else(|p| p.into_inner()).take() {
            handle.abort();
        }
    }
}
