use serde::{Deserialize, Serialize};

use crate::domain::normalize_token;
use crate::domain::policy::PolicyId;
use crate::errors::DomainError;

/// The three compliance documents every shipment policy needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CommercialInvoice,
    PackingList,
    BillOfLading,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] =
        [DocumentKind::CommercialInvoice, DocumentKind::PackingList, DocumentKind::BillOfLading];

    pub fn label(self) -> &'static str {
        match self {
            Self::CommercialInvoice => "Commercial Invoice",
            Self::PackingList => "Packing List",
            Self::BillOfLading => "Bill of Lading",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Uploaded,
    Approved,
    Rejected,
}

impl DocumentStatus {
    /// Unknown or empty values are treated as `Pending`.
    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "uploaded" => Self::Uploaded,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentEvent {
    Upload { url: Option<String> },
    Approve,
    Reject { reason: Option<String> },
}

impl DocumentEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSlot {
    pub status: DocumentStatus,
    pub url: Option<String>,
    pub rejected_reason: Option<String>,
}

impl DocumentSlot {
    pub fn with_status(status: DocumentStatus) -> Self {
        Self { status, ..Self::default() }
    }

    /// Apply one lifecycle event to the slot.
    ///
    /// Uploading is allowed from every state; a fresh upload over an approved
    /// or rejected document puts it back into review. Review decisions are
    /// only valid for an uploaded document.
    pub fn apply(&mut self, kind: DocumentKind, event: DocumentEvent) -> Result<(), DomainError> {
        let invalid = |from: DocumentStatus, event: &DocumentEvent| {
            DomainError::InvalidDocumentTransition { kind, from, event: event.name() }
        };

        match (self.status, event) {
            (_, DocumentEvent::Upload { url }) => {
                self.status = DocumentStatus::Uploaded;
                self.url = url;
                self.rejected_reason = None;
            }
            (DocumentStatus::Uploaded, DocumentEvent::Approve) => {
                self.status = DocumentStatus::Approved;
            }
            (DocumentStatus::Uploaded, DocumentEvent::Reject { reason }) => {
                self.status = DocumentStatus::Rejected;
                self.rejected_reason = reason;
            }
            (from, event) => return Err(invalid(from, &event)),
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet {
    pub policy_id: PolicyId,
    pub commercial_invoice: DocumentSlot,
    pub packing_list: DocumentSlot,
    pub bill_of_lading: DocumentSlot,
}

impl DocumentSet {
    /// A set with every slot still pending.
    pub fn empty(policy_id: PolicyId) -> Self {
        Self {
            policy_id,
            commercial_invoice: DocumentSlot::default(),
            packing_list: DocumentSlot::default(),
            bill_of_lading: DocumentSlot::default(),
        }
    }

    pub fn slot(&self, kind: DocumentKind) -> &DocumentSlot {
        match kind {
            DocumentKind::CommercialInvoice => &self.commercial_invoice,
            DocumentKind::PackingList => &self.packing_list,
            DocumentKind::BillOfLading => &self.bill_of_lading,
        }
    }

    pub fn slot_mut(&mut self, kind: DocumentKind) -> &mut DocumentSlot {
        match kind {
            DocumentKind::CommercialInvoice => &mut self.commercial_invoice,
            DocumentKind::PackingList => &mut self.packing_list,
            DocumentKind::BillOfLading => &mut self.bill_of_lading,
        }
    }

    pub fn apply(&mut self, kind: DocumentKind, event: DocumentEvent) -> Result<(), DomainError> {
        self.slot_mut(kind).apply(kind, event)
    }

    pub fn slots(&self) -> impl Iterator<Item = (DocumentKind, &DocumentSlot)> + '_ {
        DocumentKind::ALL.into_iter().map(move |kind| (kind, self.slot(kind)))
    }
}
