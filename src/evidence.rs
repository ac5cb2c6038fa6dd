//! Evidence gate for "mark compliant" transitions.
//!
//! Advisory only: the server runs its own authoritative check on every
//! completion, and replayed offline edits are re-validated there. This
//! client-side gate exists purely to avoid obviously-futile round trips
//! while online. It must never be the sole enforcement point.

use crate::model::{EvidenceState, Indicator};

/// Whether an indicator may be transitioned to Compliant right now.
///
/// Online, only reviewed-and-accepted evidence passes. When operating on
/// the offline fallback the gate is bypassed entirely: the completion is
/// accepted locally and queued, and the server enforces its own check when
/// the edit is eventually replayed.
pub fn can_complete(state: EvidenceState, offline_fallback: bool) -> bool {
    if offline_fallback {
        return true;
    }
    matches!(
        state,
        EvidenceState::Accepted | EvidenceState::EvidenceComplete
    )
}

/// User-facing reason a completion is blocked, or `None` when eligible.
pub fn completion_block_reason(state: EvidenceState) -> Option<&'static str> {
    match state {
        EvidenceState::Accepted | EvidenceState::EvidenceComplete => None,
        EvidenceState::NoEvidence => {
            Some("This indicator requires evidence before it can be completed.")
        }
        EvidenceState::Rejected => {
            Some("Evidence has been rejected. Please add new evidence before completing.")
        }
        EvidenceState::PartialEvidence | EvidenceState::ReviewPending => {
            Some("Evidence is incomplete or pending review. Please ensure all evidence is accepted.")
        }
    }
}

/// Evidence state to evaluate for an indicator that may predate the review
/// workflow: fall back to a state derived from the evidence count.
pub fn effective_evidence_state(indicator: &Indicator) -> EvidenceState {
    indicator.evidence_state.unwrap_or({
        if indicator.evidence.is_empty() {
            EvidenceState::NoEvidence
        } else {
            EvidenceState::PartialEvidence
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComplianceStatus, Evidence, EvidenceType};
    use chrono::Utc;

    #[test]
    fn test_online_gate_by_state() {
        assert!(!can_complete(EvidenceState::NoEvidence, false));
        assert!(!can_complete(EvidenceState::PartialEvidence, false));
        assert!(!can_complete(EvidenceState::ReviewPending, false));
        assert!(!can_complete(EvidenceState::Rejected, false));
        assert!(can_complete(EvidenceState::Accepted, false));
        assert!(can_complete(EvidenceState::EvidenceComplete, false));
    }

    #[test]
    fn test_offline_fallback_bypasses_gate() {
        assert!(can_complete(EvidenceState::NoEvidence, true));
        assert!(can_complete(EvidenceState::Rejected, true));
    }

    #[test]
    fn test_block_reasons_match_eligibility() {
        assert!(completion_block_reason(EvidenceState::Accepted).is_none());
        assert!(completion_block_reason(EvidenceState::EvidenceComplete).is_none());
        assert!(completion_block_reason(EvidenceState::NoEvidence)
            .unwrap()
            .contains("requires evidence"));
        assert!(completion_block_reason(EvidenceState::Rejected)
            .unwrap()
            .contains("rejected"));
        assert!(completion_block_reason(EvidenceState::ReviewPending)
            .unwrap()
            .contains("pending review"));
    }

    #[test]
    fn test_effective_state_derived_from_count() {
        let mut indicator = Indicator {
            id: "IND-1".into(),
            section: "A".into(),
            standard: "A.1".into(),
            indicator: "Fire safety drill".into(),
            description: String::new(),
            score: 0,
            status: ComplianceStatus::NotStarted,
            notes: None,
            evidence: Vec::new(),
            evidence_state: None,
            frequency: None,
            last_updated: None,
        };
        assert_eq!(
            effective_evidence_state(&indicator),
            EvidenceState::NoEvidence
        );

        indicator.evidence.push(Evidence {
            id: "EV-1".into(),
            date_uploaded: Utc::now(),
            kind: EvidenceType::Note,
            file_name: None,
            file_url: None,
            content: Some("logged".into()),
        });
        assert_eq!(
            effective_evidence_state(&indicator),
            EvidenceState::PartialEvidence
        );

        indicator.evidence_state = Some(EvidenceState::Accepted);
        assert_eq!(
            effective_evidence_state(&indicator),
            EvidenceState::Accepted
        );
    }
}
