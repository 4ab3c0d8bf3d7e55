use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::policy::{Policy, PolicyId};
use crate::domain::quote::{Quote, QuoteId, QuoteStatus};
use crate::status::{days_until, resolve, LifecycleState, ObjectKind, StatusView, Subject};

pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 7;

/// Call-to-action shown next to a feed row.
///
/// Derived from the same [`LifecycleState`] as the status badge but mapped
/// on its own, so badge wording and button wording can change independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonIntent {
    ContinueQuote,
    ViewQuote,
    FixAndResubmit,
    UploadDocuments,
    PayNow,
    RetryPayment,
    ViewReceipt,
    ViewPolicy,
    ViewDetails,
    Requote,
    RenewPolicy,
}

impl ButtonIntent {
    pub fn for_state(state: &LifecycleState) -> Self {
        match state {
            LifecycleState::Draft => Self::ContinueQuote,
            LifecycleState::Submitted
            | LifecycleState::UnderReview
            | LifecycleState::WaitingForReview
            | LifecycleState::DocumentsUnderReview => Self::ViewQuote,
            LifecycleState::FixAndResubmit => Self::FixAndResubmit,
            LifecycleState::WaitingForDocs => Self::UploadDocuments,
            LifecycleState::AwaitingPayment | LifecycleState::PayToActivate => Self::PayNow,
            LifecycleState::PaymentFailed => Self::RetryPayment,
            LifecycleState::Refunded => Self::ViewReceipt,
            LifecycleState::ApprovedAndPaid
            | LifecycleState::Converted
            | LifecycleState::PolicyActive
            | LifecycleState::PolicyPending
            | LifecycleState::PolicyCancelled => Self::ViewPolicy,
            LifecycleState::Expired { kind: ObjectKind::Quote } => Self::Requote,
            LifecycleState::Expired { kind: ObjectKind::Policy } => Self::RenewPolicy,
            LifecycleState::Rejected | LifecycleState::Unrecognized { .. } => Self::ViewDetails,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ContinueQuote => "Continue Quote",
            Self::ViewQuote => "View Quote",
            Self::FixAndResubmit => "Fix & Resubmit",
            Self::UploadDocuments => "Upload Documents",
            Self::PayNow => "Pay Now",
            Self::RetryPayment => "Retry Payment",
            Self::ViewReceipt => "View Receipt",
            Self::ViewPolicy => "View Policy",
            Self::ViewDetails => "View Details",
            Self::Requote => "Request New Quote",
            Self::RenewPolicy => "Renew Policy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub record_id: String,
    /// Customer-facing number (`quote_number` or `policy_number`).
    pub reference: String,
    pub data_type: ObjectKind,
    pub cargo: Option<String>,
    pub amount: Option<Decimal>,
    pub status_view: StatusView,
    pub button: ButtonIntent,
    pub button_label: String,
    pub expiring_days: Option<i64>,
    pub expiring_soon: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub sort_timestamp: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedSettings {
    pub expiring_soon_days: i64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self { expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ActivityFeedBuilder {
    settings: FeedSettings,
}

impl ActivityFeedBuilder {
    pub fn new(settings: FeedSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> FeedSettings {
        self.settings
    }

    /// Merge quotes and policies into one feed, most recent first.
    ///
    /// Ties keep input order (quotes before policies); rows without any
    /// timestamp go last. Output depends only on the arguments.
    pub fn build(
        &self,
        quotes: &[Quote],
        policies: &[Policy],
        now: DateTime<Utc>,
    ) -> Vec<ActivityItem> {
        let mut quotes_by_id: BTreeMap<&QuoteId, &Quote> = BTreeMap::new();
        let mut quotes_by_policy: BTreeMap<&PolicyId, &Quote> = BTreeMap::new();
        for quote in quotes {
            quotes_by_id.entry(&quote.id).or_insert(quote);
            if let Some(policy_id) = &quote.policy_id {
                quotes_by_policy.entry(policy_id).or_insert(quote);
            }
        }

        let mut items = Vec::with_capacity(quotes.len() + policies.len());
        items.extend(quotes.iter().map(|quote| self.quote_item(quote, now)));
        items.extend(policies.iter().map(|policy| {
            let linked = policy
                .quote_id
                .as_ref()
                .and_then(|quote_id| quotes_by_id.get(quote_id).copied())
                .or_else(|| quotes_by_policy.get(&policy.id).copied());
            self.policy_item(policy, linked, now)
        }));

        items.sort_by(|left, right| right.sort_timestamp.cmp(&left.sort_timestamp));
        items
    }

    fn quote_item(&self, quote: &Quote, now: DateTime<Utc>) -> ActivityItem {
        let status_view = resolve(
            Subject::Quote(&quote.status),
            quote.payment_status.as_ref(),
            quote.quote_expires_at,
            now,
        );
        let no_countdown = quote.status == QuoteStatus::Rejected || quote.is_approved_and_paid();
        let expiring_days = if no_countdown {
            None
        } else {
            quote.quote_expires_at.map(|expires_at| days_until(expires_at, now))
        };

        self.item(
            quote.id.0.clone(),
            quote.quote_number.clone(),
            ObjectKind::Quote,
            quote.cargo_type.clone(),
            quote.shipment_value,
            status_view,
            expiring_days,
            quote.created_at,
            quote.created_at,
        )
    }

    fn policy_item(
        &self,
        policy: &Policy,
        linked: Option<&Quote>,
        now: DateTime<Utc>,
    ) -> ActivityItem {
        let status_view = resolve(Subject::Policy(&policy.status), None, policy.coverage_end, now);
        let expiring_days = policy.coverage_end.map(|coverage_end| days_until(coverage_end, now));

        self.item(
            policy.id.0.clone(),
            policy.policy_number.clone(),
            ObjectKind::Policy,
            linked.and_then(|quote| quote.cargo_type.clone()),
            policy.coverage_amount,
            status_view,
            expiring_days,
            policy.created_at,
            policy.created_at.or(policy.coverage_start),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn item(
        &self,
        record_id: String,
        reference: String,
        data_type: ObjectKind,
        cargo: Option<String>,
        amount: Option<Decimal>,
        status_view: StatusView,
        expiring_days: Option<i64>,
        created_at: Option<DateTime<Utc>>,
        sort_timestamp: Option<DateTime<Utc>>,
    ) -> ActivityItem {
        let button = ButtonIntent::for_state(&status_view.state);
        let expiring_soon = expiring_days
            .is_some_and(|days| (0..=self.settings.expiring_soon_days).contains(&days));

        ActivityItem {
            record_id,
            reference,
            data_type,
            cargo,
            amount,
            status_view,
            button,
            button_label: button.label().to_string(),
            expiring_days,
            expiring_soon,
            created_at,
            sort_timestamp,
        }
    }
}
