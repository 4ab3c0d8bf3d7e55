use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DAY_MILLIS: i64 = 86_400_000;

/// Whole days from `now` until `target`, rounded up.
///
/// Anything later today counts as one day left; anything earlier today rounds
/// to zero.
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (target - now).num_milliseconds();
    -(-millis).div_euclid(DAY_MILLIS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "days", rename_all = "snake_case")]
pub enum DayDelta {
    Left(i64),
    Today,
    Ago(i64),
}

impl DayDelta {
    pub fn from_days(days: i64) -> Self {
        match days {
            0 => Self::Today,
            days if days > 0 => Self::Left(days),
            days => Self::Ago(days.saturating_neg()),
        }
    }

    pub fn between(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_days(days_until(target, now))
    }

    pub fn annotation(&self) -> String {
        match self {
            Self::Left(1) => "(1 day left)".to_string(),
            Self::Left(days) => format!("({days} days left)"),
            Self::Today => "(Today)".to_string(),
            Self::Ago(1) => "(1 day ago)".to_string(),
            Self::Ago(days) => format!("({days} days ago)"),
        }
    }
}
