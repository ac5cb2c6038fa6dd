//! Wire types specific to the HTTP API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Indicator;

/// Error payload returned by the server on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Best user-facing message for this failure, falling back to the
    /// HTTP status when the body carried nothing usable.
    pub fn into_message(self, status: u16) -> String {
        self.error
            .or(self.message)
            .unwrap_or_else(|| format!("HTTP {status}"))
    }
}

/// Upcoming recurring tasks, pre-grouped by the server.
///
/// The server always returns this bucketed shape; clients never re-derive
/// the grouping from a flat indicator list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBuckets {
    /// Recurring indicators past their due date and not yet compliant.
    #[serde(default)]
    pub overdue: Vec<Indicator>,
    /// Recurring indicators due today and not yet compliant.
    #[serde(default)]
    pub due_today: Vec<Indicator>,
    /// Remaining recurring indicators, keyed by frequency label.
    #[serde(default)]
    pub by_frequency: BTreeMap<String, Vec<Indicator>>,
}

impl UpcomingBuckets {
    /// Total number of tasks across all buckets.
    pub fn total(&self) -> usize {
        self.overdue.len()
            + self.due_today.len()
            + self.by_frequency.values().map(Vec::len).sum::<usize>()
    }
}
