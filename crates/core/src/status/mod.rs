//! Display status and permitted actions for quotes and policies.

pub mod delta;
pub mod state;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentStatus;

pub use delta::{days_until, DayDelta};
pub use state::{classify, LifecycleState, ObjectKind, Subject};

/// Semantic tone of a status; the rendering layer maps it to colors/icons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Danger,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    ViewPolicy,
    ViewReceipt,
    MakePayment,
    RetryPayment,
    Edit,
    Resubmit,
    CheckStatus,
    UploadDocuments,
    Delete,
}

impl StatusAction {
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::Delete)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub state: LifecycleState,
    pub label: String,
    pub severity: Severity,
    pub is_expired: bool,
    pub allowed_actions: BTreeSet<StatusAction>,
    pub annotation: Option<String>,
}

impl StatusView {
    /// Label, severity and actions for a canonical state, without annotation.
    pub fn for_state(state: LifecycleState) -> Self {
        use StatusAction::{
            CheckStatus, Delete, Edit, MakePayment, Resubmit, RetryPayment, UploadDocuments,
            ViewPolicy, ViewReceipt,
        };

        let (label, severity, actions): (String, Severity, Vec<StatusAction>) = match &state {
            LifecycleState::Expired { kind: ObjectKind::Quote } => {
                ("Expired".to_string(), Severity::Danger, vec![Delete])
            }
            LifecycleState::Expired { kind: ObjectKind::Policy } => {
                ("Expired".to_string(), Severity::Danger, vec![ViewPolicy])
            }
            LifecycleState::ApprovedAndPaid => {
                ("Approved & Paid".to_string(), Severity::Success, vec![ViewPolicy, ViewReceipt])
            }
            LifecycleState::PaymentFailed => {
                ("Payment Failed".to_string(), Severity::Danger, vec![RetryPayment])
            }
            LifecycleState::AwaitingPayment | LifecycleState::PayToActivate => {
                ("Pay to Activate".to_string(), Severity::Warning, vec![MakePayment])
            }
            LifecycleState::Refunded => ("Refunded".to_string(), Severity::Neutral, vec![]),
            LifecycleState::Draft => {
                ("Continue Quote".to_string(), Severity::Neutral, vec![Edit, Delete])
            }
            LifecycleState::Submitted => {
                ("Submitted".to_string(), Severity::Neutral, vec![CheckStatus, Delete])
            }
            LifecycleState::UnderReview => {
                ("Under Review".to_string(), Severity::Warning, vec![CheckStatus, Delete])
            }
            LifecycleState::WaitingForReview => {
                ("Waiting for Review".to_string(), Severity::Warning, vec![CheckStatus, Delete])
            }
            LifecycleState::DocumentsUnderReview => {
                ("Documents Under Review".to_string(), Severity::Warning, vec![CheckStatus, Delete])
            }
            LifecycleState::WaitingForDocs => {
                ("Waiting for Documents".to_string(), Severity::Warning, vec![UploadDocuments, Delete])
            }
            LifecycleState::Rejected => ("Rejected".to_string(), Severity::Danger, vec![Delete]),
            LifecycleState::FixAndResubmit => {
                ("Fix & Resubmit".to_string(), Severity::Warning, vec![Resubmit, Edit, Delete])
            }
            LifecycleState::Converted => {
                ("Converted to Policy".to_string(), Severity::Success, vec![ViewPolicy])
            }
            LifecycleState::PolicyActive => {
                ("Active".to_string(), Severity::Success, vec![ViewPolicy, UploadDocuments])
            }
            LifecycleState::PolicyPending => {
                ("Pending Activation".to_string(), Severity::Warning, vec![ViewPolicy])
            }
            LifecycleState::PolicyCancelled => {
                ("Cancelled".to_string(), Severity::Neutral, vec![ViewPolicy])
            }
            LifecycleState::Unrecognized { raw, .. } => {
                let label = if raw.trim().is_empty() { "Unknown".to_string() } else { raw.clone() };
                (label, Severity::Neutral, vec![])
            }
        };

        Self {
            is_expired: state.is_expired(),
            state,
            label,
            severity,
            allowed_actions: actions.into_iter().collect(),
            annotation: None,
        }
    }

    pub fn allows(&self, action: StatusAction) -> bool {
        self.allowed_actions.contains(&action)
    }

    /// Label with the day-delta annotation appended, if any.
    pub fn display_label(&self) -> String {
        match &self.annotation {
            Some(annotation) => format!("{} {annotation}", self.label),
            None => self.label.clone(),
        }
    }
}

/// Resolve the display status of a quote or policy snapshot.
///
/// Total over its inputs: unknown raw values produce the generic fallback
/// view rather than an error.
pub fn resolve(
    subject: Subject<'_>,
    payment_status: Option<&PaymentStatus>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> StatusView {
    let state = classify(subject, payment_status, expires_at, now);
    let annotation = match expires_at {
        Some(expires_at) if state.shows_countdown() => {
            Some(DayDelta::between(expires_at, now).annotation())
        }
        _ => None,
    };

    StatusView { annotation, ..StatusView::for_state(state) }
}
