use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::document::{DocumentKind, DocumentSet, DocumentStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedDocument {
    pub kind: DocumentKind,
    pub label: String,
    pub reason: Option<String>,
}

/// Compliance counts over the three required shipment documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub approved_count: u8,
    pub rejected_count: u8,
    pub pending_or_uploaded_count: u8,
    /// Labels of every slot that is not approved, in fixed slot order.
    pub missing: Vec<String>,
    pub rejected: Vec<RejectedDocument>,
}

impl DocumentSummary {
    pub const REQUIRED_SLOTS: u8 = 3;

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Approved share of the required slots, `0..=1`.
    pub fn completion_ratio(&self) -> Decimal {
        (Decimal::from(self.approved_count) / Decimal::from(Self::REQUIRED_SLOTS)).round_dp(4)
    }

    pub fn completion_percent(&self) -> u8 {
        let percent = u16::from(self.approved_count) * 100 / u16::from(Self::REQUIRED_SLOTS);
        percent.min(100) as u8
    }
}

pub fn summarize(documents: &DocumentSet) -> DocumentSummary {
    let mut summary = DocumentSummary {
        approved_count: 0,
        rejected_count: 0,
        pending_or_uploaded_count: 0,
        missing: Vec::new(),
        rejected: Vec::new(),
    };

    for (kind, slot) in documents.slots() {
        match slot.status {
            DocumentStatus::Approved => {
                summary.approved_count += 1;
                continue;
            }
            DocumentStatus::Rejected => {
                summary.rejected_count += 1;
                summary.rejected.push(RejectedDocument {
                    kind,
                    label: kind.label().to_string(),
                    reason: slot.rejected_reason.clone(),
                });
            }
            DocumentStatus::Pending | DocumentStatus::Uploaded => {
                summary.pending_or_uploaded_count += 1;
            }
        }
        summary.missing.push(kind.label().to_string());
    }

    summary
}

/// Summary for a policy with no document record at all.
pub fn summarize_missing() -> DocumentSummary {
    DocumentSummary {
        approved_count: 0,
        rejected_count: 0,
        pending_or_uploaded_count: DocumentSummary::REQUIRED_SLOTS,
        missing: DocumentKind::ALL.iter().map(|kind| kind.label().to_string()).collect(),
        rejected: Vec::new(),
    }
}
