//! Rolling-window conversion reports and portfolio headline numbers.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::policy::Policy;
use crate::domain::quote::{Quote, QuoteStatus};
use crate::status::{classify, days_until, LifecycleState, Subject};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportWindow {
    #[serde(rename = "This Week")]
    ThisWeek,
    #[serde(rename = "This Month")]
    ThisMonth,
    #[serde(rename = "Last Month")]
    LastMonth,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
}

impl ReportWindow {
    pub const ALL: [ReportWindow; 4] =
        [Self::ThisWeek, Self::ThisMonth, Self::LastMonth, Self::LastQuarter];

    pub fn name(self) -> &'static str {
        match self {
            Self::ThisWeek => "This Week",
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::LastQuarter => "Last Quarter",
        }
    }

    /// Calendar bounds of the window relative to `now` (UTC calendar).
    pub fn bounds(self, now: DateTime<Utc>) -> WindowBounds {
        let (year, month) = (now.year(), now.month());
        match self {
            Self::ThisWeek => WindowBounds::closed(now - Duration::days(7), now),
            Self::ThisMonth => WindowBounds::closed(first_of_month(year, month), now),
            Self::LastMonth => {
                let (prev_year, prev_month) = shift_months(year, month, -1);
                WindowBounds::half_open(
                    first_of_month(prev_year, prev_month),
                    first_of_month(year, month),
                )
            }
            Self::LastQuarter => {
                let quarter_start_month = (month - 1) / 3 * 3 + 1;
                let (prev_year, prev_month) = shift_months(year, quarter_start_month, -3);
                WindowBounds::half_open(
                    first_of_month(prev_year, prev_month),
                    first_of_month(year, quarter_start_month),
                )
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_inclusive: bool,
}

impl WindowBounds {
    fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end, end_inclusive: true }
    }

    fn half_open(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end, end_inclusive: false }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let before_end = if self.end_inclusive { instant <= self.end } else { instant < self.end };
        self.start <= instant && before_end
    }
}

fn shift_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn first_of_month(year: i32, month: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Reporting outcome of a single quote; at most one per quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteOutcome {
    Approved,
    Declined,
    Expired,
}

/// Approved-and-paid wins over rejected, which wins over expired.
pub fn quote_outcome(quote: &Quote, now: DateTime<Utc>) -> Option<QuoteOutcome> {
    if quote.is_approved_and_paid() {
        return Some(QuoteOutcome::Approved);
    }
    if quote.status == QuoteStatus::Rejected {
        return Some(QuoteOutcome::Declined);
    }
    if quote.status == QuoteStatus::Expired || quote.is_past_expiry(now) {
        return Some(QuoteOutcome::Expired);
    }
    None
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowTally {
    pub total: u32,
    pub approved: u32,
    pub declined: u32,
    pub expired: u32,
}

impl WindowTally {
    fn record(&mut self, outcome: Option<QuoteOutcome>) {
        self.total += 1;
        match outcome {
            Some(QuoteOutcome::Approved) => self.approved += 1,
            Some(QuoteOutcome::Declined) => self.declined += 1,
            Some(QuoteOutcome::Expired) => self.expired += 1,
            None => {}
        }
    }

    pub fn undecided(&self) -> u32 {
        self.total.saturating_sub(self.approved + self.declined + self.expired)
    }

    pub fn conversion_rate(&self) -> Decimal {
        ratio(self.approved, self.total)
    }

    pub fn decline_rate(&self) -> Decimal {
        ratio(self.declined, self.total)
    }

    pub fn expiry_rate(&self) -> Decimal {
        ratio(self.expired, self.total)
    }
}

fn ratio(numerator: u32, denominator: u32) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(numerator) / Decimal::from(denominator)).round_dp(4)
}

pub type ConversionReport = BTreeMap<ReportWindow, WindowTally>;

/// Tally quote outcomes for every report window.
///
/// Windows overlap: a quote from three days ago is counted in both
/// "This Week" and "This Month". Quotes without `created_at` are skipped.
pub fn aggregate(quotes: &[Quote], now: DateTime<Utc>) -> ConversionReport {
    let windows: Vec<(ReportWindow, WindowBounds)> =
        ReportWindow::ALL.iter().map(|window| (*window, window.bounds(now))).collect();
    let mut report: ConversionReport =
        ReportWindow::ALL.iter().map(|window| (*window, WindowTally::default())).collect();

    for quote in quotes {
        let Some(created_at) = quote.created_at else {
            continue;
        };
        let outcome = quote_outcome(quote, now);

        for (window, bounds) in &windows {
            if bounds.contains(created_at) {
                report.entry(*window).or_default().record(outcome);
            }
        }
    }

    report
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub active_policies: u32,
    pub total_active_coverage: Decimal,
    pub quotes_awaiting_payment: u32,
    pub policies_ending_soon: u32,
    pub horizon_days: i64,
}

/// Headline numbers for the customer dashboard.
pub fn portfolio_summary(
    quotes: &[Quote],
    policies: &[Policy],
    now: DateTime<Utc>,
    horizon_days: i64,
) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        active_policies: 0,
        total_active_coverage: Decimal::ZERO,
        quotes_awaiting_payment: 0,
        policies_ending_soon: 0,
        horizon_days,
    };

    for policy in policies.iter().filter(|policy| policy.is_currently_covering(now)) {
        summary.active_policies += 1;
        summary.total_active_coverage += policy.coverage_amount.unwrap_or_default();

        let ends_in = policy.coverage_end.map(|end| days_until(end, now));
        if ends_in.is_some_and(|days| (0..=horizon_days).contains(&days)) {
            summary.policies_ending_soon += 1;
        }
    }

    summary.quotes_awaiting_payment = quotes
        .iter()
        .filter(|quote| {
            matches!(
                classify(
                    Subject::Quote(&quote.status),
                    quote.payment_status.as_ref(),
                    quote.quote_expires_at,
                    now
                ),
                LifecycleState::AwaitingPayment
                    | LifecycleState::PayToActivate
                    | LifecycleState::PaymentFailed
            )
        })
        .count() as u32;

    summary
}
