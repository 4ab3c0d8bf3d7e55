pub mod analytics;
pub mod clock;
pub mod compliance;
pub mod config;
pub mod domain;
pub mod eligibility;
pub mod engine;
pub mod errors;
pub mod feed;
pub mod payments;
pub mod records;
pub mod snapshot;
pub mod status;

pub use analytics::{
    aggregate, portfolio_summary, quote_outcome, ConversionReport, PortfolioSummary,
    QuoteOutcome, ReportWindow, WindowBounds, WindowTally,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use compliance::{summarize, DocumentSummary, RejectedDocument};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::document::{DocumentEvent, DocumentKind, DocumentSet, DocumentSlot, DocumentStatus};
pub use domain::payment::{PaymentRecord, PaymentStatus};
pub use domain::policy::{CoverageWindow, Policy, PolicyId, PolicyStatus};
pub use domain::quote::{Quote, QuoteId, QuoteStatus};
pub use eligibility::{evaluate, BlockingReason, EligibilityVerdict};
pub use engine::{EngineSettings, PortalEngine};
pub use errors::{ApplicationError, DomainError};
pub use feed::{ActivityFeedBuilder, ActivityItem, ButtonIntent, FeedSettings};
pub use snapshot::{Snapshot, SnapshotRows};
pub use status::{
    classify, days_until, resolve, DayDelta, LifecycleState, ObjectKind, Severity, StatusAction,
    StatusView, Subject,
};
