use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compliance::{summarize_missing, DocumentSummary};
use crate::domain::payment::PaymentStatus;
use crate::domain::policy::{Policy, PolicyStatus};

/// Outcome of the claim-filing gate with each condition reported separately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub policy_active: bool,
    pub payment_completed: bool,
    pub coverage_valid: bool,
    pub documents_complete: bool,
    pub can_file_claim: bool,
    pub missing_documents: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockingReason {
    PolicyInactive,
    PaymentIncomplete,
    OutsideCoverage,
    DocumentsMissing { labels: Vec<String> },
}

impl BlockingReason {
    pub fn message(&self) -> String {
        match self {
            Self::PolicyInactive => "policy is not active".to_string(),
            Self::PaymentIncomplete => "premium payment has not been completed".to_string(),
            Self::OutsideCoverage => "today is outside the coverage period".to_string(),
            Self::DocumentsMissing { labels } => {
                format!("documents still need approval: {}", labels.join(", "))
            }
        }
    }
}

impl EligibilityVerdict {
    fn from_conditions(
        policy_active: bool,
        payment_completed: bool,
        coverage_valid: bool,
        missing_documents: Vec<String>,
    ) -> Self {
        let documents_complete = missing_documents.is_empty();
        Self {
            policy_active,
            payment_completed,
            coverage_valid,
            documents_complete,
            can_file_claim: policy_active && payment_completed && coverage_valid && documents_complete,
            missing_documents,
        }
    }

    /// Verdict used when the policy or its document summary is unavailable.
    pub fn blocked() -> Self {
        Self::from_conditions(false, false, false, summarize_missing().missing)
    }

    pub fn blocking_reasons(&self) -> Vec<BlockingReason> {
        let mut reasons = Vec::new();
        if !self.policy_active {
            reasons.push(BlockingReason::PolicyInactive);
        }
        if !self.payment_completed {
            reasons.push(BlockingReason::PaymentIncomplete);
        }
        if !self.coverage_valid {
            reasons.push(BlockingReason::OutsideCoverage);
        }
        if !self.documents_complete {
            reasons.push(BlockingReason::DocumentsMissing {
                labels: self.missing_documents.clone(),
            });
        }
        reasons
    }
}

/// Decide whether a claim may be filed against `policy` at `now`.
///
/// A corrupt or inverted coverage range only clears `coverage_valid`; it
/// never fails the evaluation.
pub fn evaluate(
    policy: Option<&Policy>,
    documents: Option<&DocumentSummary>,
    now: DateTime<Utc>,
) -> EligibilityVerdict {
    let (Some(policy), Some(documents)) = (policy, documents) else {
        return EligibilityVerdict::blocked();
    };

    let policy_active = policy.status == PolicyStatus::Active;
    let payment_completed = policy.payment_status.as_ref().is_some_and(PaymentStatus::is_settled);
    let coverage_valid =
        policy.coverage_window().map(|window| window.contains(now)).unwrap_or(false);

    EligibilityVerdict::from_conditions(
        policy_active,
        payment_completed,
        coverage_valid,
        documents.missing.clone(),
    )
}
