use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::document::DocumentSet;
use crate::domain::payment::PaymentRecord;
use crate::domain::policy::{Policy, PolicyId};
use crate::domain::quote::Quote;
use crate::errors::ApplicationError;
use crate::payments::{attach_payment_status, attach_quote_payment_status};
use crate::records::{DocumentRow, PaymentRow, PolicyRow, QuoteRow};

/// Raw export of the portal tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotRows {
    pub quotes: Vec<QuoteRow>,
    pub policies: Vec<PolicyRow>,
    pub documents: Vec<DocumentRow>,
    pub payments: Vec<PaymentRow>,
}

/// Fully materialized records for one customer, ready for the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub quotes: Vec<Quote>,
    pub policies: Vec<Policy>,
    pub documents: Vec<DocumentSet>,
    pub payments: Vec<PaymentRecord>,
}

impl Snapshot {
    pub fn from_rows(rows: SnapshotRows) -> Self {
        let payments: Vec<PaymentRecord> = rows.payments.into_iter().map(Into::into).collect();

        let mut policies: Vec<Policy> = rows.policies.into_iter().map(Into::into).collect();
        attach_payment_status(&mut policies, &payments);

        let mut quotes: Vec<Quote> = rows.quotes.into_iter().map(Into::into).collect();
        attach_quote_payment_status(&mut quotes, &policies, &payments);

        Self {
            quotes,
            policies,
            documents: rows.documents.into_iter().map(Into::into).collect(),
            payments,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ApplicationError> {
        let rows: SnapshotRows = serde_json::from_str(raw)
            .map_err(|error| ApplicationError::Snapshot(format!("invalid snapshot json: {error}")))?;
        Ok(Self::from_rows(rows))
    }

    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            ApplicationError::Snapshot(format!("could not read `{}`: {error}", path.display()))
        })?;
        let snapshot = Self::from_json_str(&raw)?;

        tracing::debug!(
            event_name = "snapshot.loaded",
            path = %path.display(),
            quotes = snapshot.quotes.len(),
            policies = snapshot.policies.len(),
            documents = snapshot.documents.len(),
            payments = snapshot.payments.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Policy by exact id, falling back to policy number.
    pub fn policy(&self, policy_ref: &str) -> Option<&Policy> {
        self.policies
            .iter()
            .find(|policy| policy.id.0 == policy_ref)
            .or_else(|| self.policies.iter().find(|policy| policy.policy_number == policy_ref))
    }

    /// Document record for a policy; the last row wins when exported twice.
    pub fn documents_for(&self, policy_id: &PolicyId) -> Option<&DocumentSet> {
        self.documents.iter().rev().find(|documents| &documents.policy_id == policy_id)
    }
}
