//! Storage rows as exported by the portal database, and their normalization
//! into domain types.
//!
//! Normalization never fails: unknown enum values are kept as `Other`,
//! unreadable timestamps become `None` and missing document statuses become
//! `pending`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::document::{DocumentSet, DocumentSlot, DocumentStatus};
use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::domain::policy::{Policy, PolicyId, PolicyStatus};
use crate::domain::quote::{Quote, QuoteId, QuoteStatus};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteRow {
    pub id: String,
    pub quote_number: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub cargo_type: Option<String>,
    pub shipment_value: Option<Decimal>,
    pub created_at: Option<String>,
    pub quote_expires_at: Option<String>,
    pub policy_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRow {
    pub id: String,
    pub policy_number: Option<String>,
    pub status: Option<String>,
    pub coverage_amount: Option<Decimal>,
    pub coverage_start: Option<String>,
    pub coverage_end: Option<String>,
    pub quote_id: Option<String>,
    pub payment_status: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRow {
    pub policy_id: String,
    pub commercial_invoice_status: Option<String>,
    pub commercial_invoice_url: Option<String>,
    pub commercial_invoice_rejected_reason: Option<String>,
    pub packing_list_status: Option<String>,
    pub packing_list_url: Option<String>,
    pub packing_list_rejected_reason: Option<String>,
    pub bill_of_lading_status: Option<String>,
    pub bill_of_lading_url: Option<String>,
    pub bill_of_lading_rejected_reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentRow {
    pub quote_id: Option<String>,
    pub policy_id: Option<String>,
    pub payment_status: Option<String>,
    pub amount: Option<Decimal>,
    pub completed_at: Option<String>,
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` and `YYYY-MM-DD`; naive values
/// are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn timestamp_field(
    record_id: &str,
    field: &'static str,
    raw: Option<&str>,
) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::debug!(
            event_name = "records.timestamp.unparseable",
            record_id,
            field,
            raw,
            "dropping unparseable timestamp"
        );
    }
    parsed
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

impl From<QuoteRow> for Quote {
    fn from(row: QuoteRow) -> Self {
        let created_at = timestamp_field(&row.id, "created_at", row.created_at.as_deref());
        let quote_expires_at =
            timestamp_field(&row.id, "quote_expires_at", row.quote_expires_at.as_deref());

        Self {
            quote_number: non_empty(row.quote_number).unwrap_or_else(|| row.id.clone()),
            status: QuoteStatus::parse(row.status.as_deref().unwrap_or_default()),
            payment_status: non_empty(row.payment_status).map(|raw| PaymentStatus::parse(&raw)),
            cargo_type: non_empty(row.cargo_type),
            shipment_value: row.shipment_value,
            created_at,
            quote_expires_at,
            policy_id: non_empty(row.policy_id).map(PolicyId),
            id: QuoteId(row.id),
        }
    }
}

impl From<PolicyRow> for Policy {
    fn from(row: PolicyRow) -> Self {
        let coverage_start =
            timestamp_field(&row.id, "coverage_start", row.coverage_start.as_deref());
        let coverage_end = timestamp_field(&row.id, "coverage_end", row.coverage_end.as_deref());
        let created_at = timestamp_field(&row.id, "created_at", row.created_at.as_deref());

        Self {
            policy_number: non_empty(row.policy_number).unwrap_or_else(|| row.id.clone()),
            status: PolicyStatus::parse(row.status.as_deref().unwrap_or_default()),
            coverage_amount: row.coverage_amount,
            coverage_start,
            coverage_end,
            quote_id: non_empty(row.quote_id).map(QuoteId),
            payment_status: non_empty(row.payment_status).map(|raw| PaymentStatus::parse(&raw)),
            created_at,
            id: PolicyId(row.id),
        }
    }
}

fn slot(status: Option<&str>, url: Option<String>, rejected_reason: Option<String>) -> DocumentSlot {
    DocumentSlot {
        status: status.map(DocumentStatus::parse_lenient).unwrap_or_default(),
        url: non_empty(url),
        rejected_reason: non_empty(rejected_reason),
    }
}

impl From<DocumentRow> for DocumentSet {
    fn from(row: DocumentRow) -> Self {
        Self {
            policy_id: PolicyId(row.policy_id),
            commercial_invoice: slot(
                row.commercial_invoice_status.as_deref(),
                row.commercial_invoice_url,
                row.commercial_invoice_rejected_reason,
            ),
            packing_list: slot(
                row.packing_list_status.as_deref(),
                row.packing_list_url,
                row.packing_list_rejected_reason,
            ),
            bill_of_lading: slot(
                row.bill_of_lading_status.as_deref(),
                row.bill_of_lading_url,
                row.bill_of_lading_rejected_reason,
            ),
        }
    }
}

impl From<PaymentRow> for PaymentRecord {
    fn from(row: PaymentRow) -> Self {
        let reference = row.policy_id.clone().or_else(|| row.quote_id.clone()).unwrap_or_default();
        let completed_at = timestamp_field(&reference, "completed_at", row.completed_at.as_deref());

        Self {
            quote_id: non_empty(row.quote_id).map(QuoteId),
            policy_id: non_empty(row.policy_id).map(PolicyId),
            payment_status: PaymentStatus::parse(row.payment_status.as_deref().unwrap_or_default()),
            amount: row.amount,
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{parse_timestamp, DocumentRow, PolicyRow, QuoteRow};
    use crate::domain::document::{DocumentSet, DocumentStatus};
    use crate::domain::payment::PaymentStatus;
    use crate::domain::policy::{Policy, PolicyStatus};
    use crate::domain::quote::{Quote, QuoteStatus};

    #[test]
    fn parses_supported_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 19, 14, 5, 0).single().expect("valid");
        assert_eq!(parse_timestamp("2026-01-19T14:05:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-19T16:05:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-19 14:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-19T14:05:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-01-19"),
            Utc.with_ymd_and_hms(2026, 1, 19, 0, 0, 0).single()
        );
        assert_eq!(parse_timestamp("next tuesday"), None);
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn quote_row_normalizes_without_failing() {
        let row: QuoteRow = serde_json::from_str(
            r#"{
                "id": "q-9",
                "quote_number": "QT-0009",
                "status": "awaiting_underwriter",
                "payment_status": "",
                "cargo_type": "Frozen Seafood",
                "shipment_value": "125000.50",
                "created_at": "2026-02-01T10:00:00Z",
                "quote_expires_at": "not a date"
            }"#,
        )
        .expect("row parses");

        let quote = Quote::from(row);
        assert_eq!(quote.status, QuoteStatus::Other("awaiting_underwriter".to_string()));
        assert_eq!(quote.payment_status, None);
        assert_eq!(quote.shipment_value, Some(Decimal::new(12_500_050, 2)));
        assert!(quote.created_at.is_some());
        assert_eq!(quote.quote_expires_at, None);
        assert_eq!(quote.policy_id, None);
    }

    #[test]
    fn policy_row_defaults_number_to_id() {
        let policy = Policy::from(PolicyRow {
            id: "pol-3".to_string(),
            status: Some("Active".to_string()),
            payment_status: Some("completed".to_string()),
            ..PolicyRow::default()
        });

        assert_eq!(policy.policy_number, "pol-3");
        assert_eq!(policy.status, PolicyStatus::Active);
        assert_eq!(policy.payment_status, Some(PaymentStatus::Completed));
        assert!(policy.coverage_window().is_err());
    }

    #[test]
    fn missing_document_statuses_default_to_pending() {
        let documents = DocumentSet::from(DocumentRow {
            policy_id: "pol-3".to_string(),
            packing_list_status: Some("approved".to_string()),
            bill_of_lading_status: Some("rejected".to_string()),
            bill_of_lading_rejected_reason: Some("wrong vessel".to_string()),
            ..DocumentRow::default()
        });

        assert_eq!(documents.commercial_invoice.status, DocumentStatus::Pending);
        assert_eq!(documents.packing_list.status, DocumentStatus::Approved);
        assert_eq!(documents.bill_of_lading.status, DocumentStatus::Rejected);
        assert_eq!(documents.bill_of_lading.rejected_reason.as_deref(), Some("wrong vessel"));
    }
}
