use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentStatus;
use crate::domain::policy::PolicyStatus;
use crate::domain::quote::QuoteStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Quote,
    Policy,
}

/// The raw status being classified, tagged with the kind of record it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject<'a> {
    Quote(&'a QuoteStatus),
    Policy(&'a PolicyStatus),
}

impl Subject<'_> {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Quote(_) => ObjectKind::Quote,
            Self::Policy(_) => ObjectKind::Policy,
        }
    }
}

/// Single canonical state folded from status, payment status and expiry.
///
/// Both the status badge and the feed's call-to-action are derived from this
/// value through separate mappings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Expired { kind: ObjectKind },
    ApprovedAndPaid,
    PaymentFailed,
    AwaitingPayment,
    Refunded,
    Draft,
    Submitted,
    UnderReview,
    WaitingForReview,
    DocumentsUnderReview,
    WaitingForDocs,
    Rejected,
    FixAndResubmit,
    PayToActivate,
    Converted,
    PolicyActive,
    PolicyPending,
    PolicyCancelled,
    Unrecognized { kind: ObjectKind, raw: String },
}

impl LifecycleState {
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }

    /// States whose badge carries a countdown to the expiry marker.
    pub fn shows_countdown(&self) -> bool {
        matches!(self, Self::AwaitingPayment | Self::Submitted | Self::PayToActivate)
    }
}

/// Fold the intersecting flags of a record into one [`LifecycleState`].
///
/// A passed expiry marker wins over every raw status except a quote that is
/// already approved and paid.
pub fn classify(
    subject: Subject<'_>,
    payment_status: Option<&PaymentStatus>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> LifecycleState {
    let completed = matches!(subject, Subject::Quote(QuoteStatus::Approved))
        && payment_status.is_some_and(PaymentStatus::is_settled);
    let past_expiry = expires_at.is_some_and(|expires_at| expires_at < now);

    if past_expiry && !completed {
        return LifecycleState::Expired { kind: subject.kind() };
    }

    match subject {
        Subject::Quote(status) => classify_quote(status, payment_status),
        Subject::Policy(status) => classify_policy(status),
    }
}

fn classify_quote(status: &QuoteStatus, payment_status: Option<&PaymentStatus>) -> LifecycleState {
    match status {
        QuoteStatus::Approved => match payment_status {
            Some(PaymentStatus::Paid | PaymentStatus::Completed) => LifecycleState::ApprovedAndPaid,
            Some(PaymentStatus::Failed) => LifecycleState::PaymentFailed,
            Some(PaymentStatus::Refunded) => LifecycleState::Refunded,
            Some(PaymentStatus::Pending | PaymentStatus::Other(_)) | None => {
                LifecycleState::AwaitingPayment
            }
        },
        QuoteStatus::Draft => LifecycleState::Draft,
        QuoteStatus::Submitted => LifecycleState::Submitted,
        QuoteStatus::UnderReview => LifecycleState::UnderReview,
        QuoteStatus::WaitingForReview => LifecycleState::WaitingForReview,
        QuoteStatus::DocumentsUnderReview => LifecycleState::DocumentsUnderReview,
        QuoteStatus::WaitingForDocs => LifecycleState::WaitingForDocs,
        QuoteStatus::Rejected => LifecycleState::Rejected,
        QuoteStatus::FixAndResubmit => LifecycleState::FixAndResubmit,
        QuoteStatus::PayToActivate => LifecycleState::PayToActivate,
        QuoteStatus::Converted => LifecycleState::Converted,
        QuoteStatus::Expired => LifecycleState::Expired { kind: ObjectKind::Quote },
        QuoteStatus::Other(raw) => {
            LifecycleState::Unrecognized { kind: ObjectKind::Quote, raw: raw.clone() }
        }
    }
}

fn classify_policy(status: &PolicyStatus) -> LifecycleState {
    match status {
        PolicyStatus::Active => LifecycleState::PolicyActive,
        PolicyStatus::Pending => LifecycleState::PolicyPending,
        PolicyStatus::Cancelled => LifecycleState::PolicyCancelled,
        PolicyStatus::Expired => LifecycleState::Expired { kind: ObjectKind::Policy },
        PolicyStatus::Other(raw) => {
            LifecycleState::Unrecognized { kind: ObjectKind::Policy, raw: raw.clone() }
        }
    }
}
