use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::normalize_token;
use crate::domain::payment::PaymentStatus;
use crate::domain::policy::PolicyId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuoteId(pub String);

/// Raw quote status as reported by the backend workflow.
///
/// `Other` keeps values this crate does not know yet so that classification
/// can fall back to a generic view instead of failing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuoteStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    FixAndResubmit,
    PayToActivate,
    WaitingForReview,
    DocumentsUnderReview,
    Expired,
    Converted,
    WaitingForDocs,
    Other(String),
}

impl QuoteStatus {
    pub fn parse(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "draft" => Self::Draft,
            "submitted" => Self::Submitted,
            "under_review" => Self::UnderReview,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            "fix_and_resubmit" => Self::FixAndResubmit,
            "pay_to_activate" => Self::PayToActivate,
            "waiting_for_review" => Self::WaitingForReview,
            "documents_under_review" => Self::DocumentsUnderReview,
            "expired" => Self::Expired,
            "converted" => Self::Converted,
            "waiting_for_docs" => Self::WaitingForDocs,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::FixAndResubmit => "fix_and_resubmit",
            Self::PayToActivate => "pay_to_activate",
            Self::WaitingForReview => "waiting_for_review",
            Self::DocumentsUnderReview => "documents_under_review",
            Self::Expired => "expired",
            Self::Converted => "converted",
            Self::WaitingForDocs => "waiting_for_docs",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for QuoteStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<QuoteStatus> for String {
    fn from(value: QuoteStatus) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub quote_number: String,
    pub status: QuoteStatus,
    /// Only meaningful once `status` is `Approved`.
    pub payment_status: Option<PaymentStatus>,
    pub cargo_type: Option<String>,
    pub shipment_value: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub quote_expires_at: Option<DateTime<Utc>>,
    pub policy_id: Option<PolicyId>,
}

impl Quote {
    pub fn is_approved_and_paid(&self) -> bool {
        self.status == QuoteStatus::Approved
            && self.payment_status.as_ref().is_some_and(PaymentStatus::is_settled)
    }

    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.quote_expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{Quote, QuoteId, QuoteStatus};
    use crate::domain::payment::PaymentStatus;

    fn quote(status: QuoteStatus, payment_status: Option<PaymentStatus>) -> Quote {
        Quote {
            id: QuoteId("q-1".to_string()),
            quote_number: "QT-1001".to_string(),
            status,
            payment_status,
            cargo_type: Some("Electronics".to_string()),
            shipment_value: None,
            created_at: None,
            quote_expires_at: None,
            policy_id: None,
        }
    }

    #[test]
    fn parses_known_statuses_and_keeps_unknown_raw_value() {
        assert_eq!(QuoteStatus::parse("Under Review"), QuoteStatus::UnderReview);
        assert_eq!(QuoteStatus::parse("waiting-for-docs"), QuoteStatus::WaitingForDocs);
        assert_eq!(
            QuoteStatus::parse("awaiting_underwriter"),
            QuoteStatus::Other("awaiting_underwriter".to_string())
        );
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&QuoteStatus::FixAndResubmit).expect("serialize");
        assert_eq!(json, "\"fix_and_resubmit\"");

        let parsed: QuoteStatus = serde_json::from_str("\"brand_new_state\"").expect("parse");
        assert_eq!(parsed, QuoteStatus::Other("brand_new_state".to_string()));
    }

    #[test]
    fn approved_and_paid_requires_settled_payment() {
        assert!(quote(QuoteStatus::Approved, Some(PaymentStatus::Paid)).is_approved_and_paid());
        assert!(quote(QuoteStatus::Approved, Some(PaymentStatus::Completed)).is_approved_and_paid());
        assert!(!quote(QuoteStatus::Approved, Some(PaymentStatus::Pending)).is_approved_and_paid());
        assert!(!quote(QuoteStatus::Approved, None).is_approved_and_paid());
        assert!(!quote(QuoteStatus::Submitted, Some(PaymentStatus::Paid)).is_approved_and_paid());
    }

    #[test]
    fn expiry_check_is_strict() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).single().expect("valid");
        let mut subject = quote(QuoteStatus::Submitted, None);
        assert!(!subject.is_past_expiry(now));

        subject.quote_expires_at = Some(now);
        assert!(!subject.is_past_expiry(now));

        subject.quote_expires_at = Some(now - Duration::seconds(1));
        assert!(subject.is_past_expiry(now));
    }
}
