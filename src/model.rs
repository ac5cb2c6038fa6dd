//! Domain model shared across the sync core.
//!
//! Wire types use the server's camelCase field names. Enum wire forms match
//! the server exactly: compliance statuses are display strings
//! ("Not Started", "Non-Compliant", ...), evidence states are snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compliance status of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Compliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
    #[serde(rename = "Not Applicable")]
    NotApplicable,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComplianceStatus::NotStarted => "Not Started",
            ComplianceStatus::InProgress => "In Progress",
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::NonCompliant => "Non-Compliant",
            ComplianceStatus::NotApplicable => "Not Applicable",
        };
        f.write_str(s)
    }
}

/// Review readiness of an indicator's evidence set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceState {
    NoEvidence,
    PartialEvidence,
    EvidenceComplete,
    ReviewPending,
    Accepted,
    Rejected,
}

/// How often a recurring indicator must be re-logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "One-time")]
    OneTime,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

/// Kind of an evidence attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceType {
    Document,
    Image,
    Certificate,
    Note,
    Link,
}

/// One piece of evidence attached to an indicator.
///
/// The sync core never stores these locally; the offline cache reduces the
/// list to a count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: String,
    pub date_uploaded: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EvidenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One audit checklist item inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub id: String,
    pub section: String,
    pub standard: String,
    /// Short title of the indicator.
    pub indicator: String,
    #[serde(default)]
    pub description: String,
    pub score: i64,
    pub status: ComplianceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_state: Option<EvidenceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A compliance project owning a set of indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub indicators: Vec<Indicator>,
    pub created_at: DateTime<Utc>,
}

/// Partial field set accepted by the per-indicator update endpoint.
///
/// The update queue allow-lists {status, score, notes} from this; anything
/// else is only ever sent on live edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplianceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_form_matches_server_strings() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"Non-Compliant\"");

        let parsed: ComplianceStatus = serde_json::from_str("\"Not Started\"").unwrap();
        assert_eq!(parsed, ComplianceStatus::NotStarted);
    }

    #[test]
    fn test_evidence_state_snake_case() {
        let json = serde_json::to_string(&EvidenceState::ReviewPending).unwrap();
        assert_eq!(json, "\"review_pending\"");
    }

    #[test]
    fn test_patch_omits_unset_fields() {
        let patch = IndicatorPatch {
            score: Some(5),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, "{\"score\":5}");
    }

    #[test]
    fn test_indicator_parses_minimal_payload() {
        let json = r#"{
            "id": "IND-1",
            "section": "A",
            "standard": "A.1",
            "indicator": "Fire safety drill",
            "score": 0,
            "status": "In Progress"
        }"#;
        let indicator: Indicator = serde_json::from_str(json).unwrap();
        assert_eq!(indicator.status, ComplianceStatus::InProgress);
        assert!(indicator.evidence.is_empty());
        assert!(indicator.last_updated.is_none());
    }
}
