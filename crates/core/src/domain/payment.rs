use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::normalize_token;
use crate::domain::policy::PolicyId;
use crate::domain::quote::QuoteId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Paid,
    /// Wording used by the payments table for a settled charge.
    Completed,
    Failed,
    Refunded,
    Other(String),
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "refunded" => Self::Refunded,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::Completed)
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PaymentStatus> for String {
    fn from(value: PaymentStatus) -> Self {
        value.as_str().to_string()
    }
}

/// One charge attempt against a quote or a policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub quote_id: Option<QuoteId>,
    pub policy_id: Option<PolicyId>,
    pub payment_status: PaymentStatus,
    pub amount: Option<Decimal>,
    pub completed_at: Option<DateTime<Utc>>,
}
