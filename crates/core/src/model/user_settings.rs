use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::plan::DateRange;

/// Default length of a freshly created plan, in days after the start date.
pub const DEFAULT_PLAN_LENGTH_DAYS: u64 = 10;

/// Persisted learner preferences: the study-plan date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub plan_start_date: NaiveDate,
    pub plan_end_date: NaiveDate,
}

impl UserSettings {
    #[must_use]
    pub fn new(plan_start_date: NaiveDate, plan_end_date: NaiveDate) -> Self {
        Self {
            plan_start_date,
            plan_end_date,
        }
    }

    /// Settings for a learner starting today with the default plan length.
    #[must_use]
    pub fn starting(today: NaiveDate) -> Self {
        let end = today
            .checked_add_days(Days::new(DEFAULT_PLAN_LENGTH_DAYS))
            .unwrap_or(today);
        Self::new(today, end)
    }

    #[must_use]
    pub fn plan_range(&self) -> DateRange {
        DateRange::new(self.plan_start_date, self.plan_end_date)
    }
}
