use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::normalize_token;
use crate::domain::payment::PaymentStatus;
use crate::domain::quote::QuoteId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyStatus {
    Active,
    Pending,
    Expired,
    Cancelled,
    Other(String),
}

impl PolicyStatus {
    pub fn parse(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "active" => Self::Active,
            "pending" => Self::Pending,
            "expired" => Self::Expired,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for PolicyStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PolicyStatus> for String {
    fn from(value: PolicyStatus) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub policy_number: String,
    pub status: PolicyStatus,
    pub coverage_amount: Option<Decimal>,
    pub coverage_start: Option<DateTime<Utc>>,
    pub coverage_end: Option<DateTime<Utc>>,
    pub quote_id: Option<QuoteId>,
    pub payment_status: Option<PaymentStatus>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Validated coverage period, `start < end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverageWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CoverageWindow {
    /// Inclusive on both bounds.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

impl Policy {
    pub fn coverage_window(&self) -> Result<CoverageWindow, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidDateRange {
            policy_id: self.id.0.clone(),
            reason: reason.to_string(),
        };

        let start = self.coverage_start.ok_or_else(|| invalid("coverage_start is missing"))?;
        let end = self.coverage_end.ok_or_else(|| invalid("coverage_end is missing"))?;
        if end <= start {
            return Err(invalid("coverage_end must be after coverage_start"));
        }

        Ok(CoverageWindow { start, end })
    }

    pub fn is_currently_covering(&self, now: DateTime<Utc>) -> bool {
        self.status == PolicyStatus::Active
            && self.coverage_window().map(|window| window.contains(now)).unwrap_or(false)
    }
}
