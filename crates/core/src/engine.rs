use crate::analytics::{self, ConversionReport, PortfolioSummary};
use crate::clock::Clock;
use crate::compliance;
use crate::domain::policy::Policy;
use crate::domain::quote::Quote;
use crate::eligibility::{self, EligibilityVerdict};
use crate::feed::{ActivityFeedBuilder, ActivityItem, FeedSettings};
use crate::snapshot::Snapshot;

pub const DEFAULT_PORTFOLIO_HORIZON_DAYS: i64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub feed: FeedSettings,
    pub portfolio_horizon_days: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            feed: FeedSettings::default(),
            portfolio_horizon_days: DEFAULT_PORTFOLIO_HORIZON_DAYS,
        }
    }
}

/// Entry point for the portal views. Every call reads the clock exactly once.
pub struct PortalEngine<C> {
    clock: C,
    settings: EngineSettings,
    feed: ActivityFeedBuilder,
}

impl<C> PortalEngine<C>
where
    C: Clock,
{
    pub fn new(clock: C) -> Self {
        Self::with_settings(clock, EngineSettings::default())
    }

    pub fn with_settings(clock: C, settings: EngineSettings) -> Self {
        Self { clock, settings, feed: ActivityFeedBuilder::new(settings.feed) }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn activity_feed(&self, quotes: &[Quote], policies: &[Policy]) -> Vec<ActivityItem> {
        let now = self.clock.now();
        let items = self.feed.build(quotes, policies, now);

        tracing::debug!(
            event_name = "portal.feed.built",
            now = %now,
            quotes = quotes.len(),
            policies = policies.len(),
            expiring_soon = items.iter().filter(|item| item.expiring_soon).count(),
            "activity feed built"
        );
        items
    }

    pub fn conversion_report(&self, quotes: &[Quote]) -> ConversionReport {
        let now = self.clock.now();
        let report = analytics::aggregate(quotes, now);

        tracing::debug!(
            event_name = "portal.analytics.aggregated",
            now = %now,
            quotes = quotes.len(),
            windows = report.len(),
            "conversion report aggregated"
        );
        report
    }

    /// Claim gate for a policy looked up by id or policy number. An unknown
    /// policy yields the fully blocked verdict.
    pub fn claim_eligibility(&self, policy_ref: &str, snapshot: &Snapshot) -> EligibilityVerdict {
        let now = self.clock.now();
        let policy = snapshot.policy(policy_ref);
        let documents = policy.map(|policy| {
            snapshot
                .documents_for(&policy.id)
                .map(compliance::summarize)
                .unwrap_or_else(compliance::summarize_missing)
        });
        let verdict = eligibility::evaluate(policy, documents.as_ref(), now);

        tracing::debug!(
            event_name = "portal.eligibility.evaluated",
            policy = policy_ref,
            found = policy.is_some(),
            can_file_claim = verdict.can_file_claim,
            "claim eligibility evaluated"
        );
        verdict
    }

    pub fn portfolio_summary(&self, quotes: &[Quote], policies: &[Policy]) -> PortfolioSummary {
        let now = self.clock.now();
        let summary = analytics::portfolio_summary(
            quotes,
            policies,
            now,
            self.settings.portfolio_horizon_days,
        );

        tracing::debug!(
            event_name = "portal.portfolio.summarized",
            active_policies = summary.active_policies,
            policies_ending_soon = summary.policies_ending_soon,
            "portfolio summarized"
        );
        summary
    }
}
