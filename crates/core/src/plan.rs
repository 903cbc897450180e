//! Study-plan distribution.
//!
//! Spreads the catalogue, in canonical order, across the days of a date
//! range. Plans are derived on every read and never stored.

use chrono::{Days, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::model::{Catalogue, ItemId};
use crate::time::{DateParseError, parse_iso_date};

/// Upper bound on the number of days a plan is spread over.
///
/// Longer ranges still schedule every item, just across this many days.
pub const MAX_PLAN_DAYS: usize = 60;

/// Display format for plan dates (`Jan 05`).
pub const PLAN_DATE_FORMAT: &str = "%b %d";

//
// ─── DATE RANGE ────────────────────────────────────────────────────────────────
//

/// Inclusive calendar-date range. `end < start` is allowed and yields an empty plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parses a range from two `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns `DateParseError` for the first string that is not a valid date.
    pub fn parse_iso(start: &str, end: &str) -> Result<Self, DateParseError> {
        Ok(Self::new(parse_iso_date(start)?, parse_iso_date(end)?))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.end >= self.start
    }

    /// Number of days the plan is spread over, both endpoints included and
    /// clamped to `1..=MAX_PLAN_DAYS`. `None` for an inverted range.
    #[must_use]
    pub fn span_days(&self) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        let raw = (self.end - self.start).num_days() + 1;
        let span = usize::try_from(raw).unwrap_or(MAX_PLAN_DAYS);
        Some(span.clamp(1, MAX_PLAN_DAYS))
    }
}

//
// ─── PLAN DAY ──────────────────────────────────────────────────────────────────
//

/// One day of a study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    /// 1-based day number.
    pub day: usize,
    pub date: NaiveDate,
    pub label: String,
    pub item_ids: Vec<ItemId>,
}

impl PlanDay {
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format(PLAN_DATE_FORMAT).to_string()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

//
// ─── DISTRIBUTION ──────────────────────────────────────────────────────────────
//

/// Partitions the catalogue's items across the days from `start` to `end`.
///
/// Every item lands on exactly one day, in catalogue order. Each day takes
/// `ceil(items / span_days)` items, so trailing days of a long range may be
/// absent. An inverted range yields an empty plan.
#[must_use]
pub fn build_plan(catalogue: &Catalogue, start: NaiveDate, end: NaiveDate) -> Vec<PlanDay> {
    let range = DateRange::new(start, end);
    let Some(span_days) = range.span_days() else {
        debug!("event=plan_built status=invalid_range start={start} end={end}");
        return Vec::new();
    };

    let ids = catalogue.flatten_ids();
    let items_per_day = ids.len().div_ceil(span_days);
    if items_per_day == 0 {
        debug!("event=plan_built status=empty_catalogue span_days={span_days}");
        return Vec::new();
    }

    let plan: Vec<PlanDay> = ids
        .chunks(items_per_day)
        .take(span_days)
        .enumerate()
        .map_while(|(offset, chunk)| {
            let date = start.checked_add_days(Days::new(u64::try_from(offset).ok()?))?;
            let day = offset + 1;
            Some(PlanDay {
                day,
                date,
                label: format!("Focus Area {day}"),
                item_ids: chunk.to_vec(),
            })
        })
        .collect();

    debug!(
        "event=plan_built status=ok span_days={span_days} items_per_day={items_per_day} days={}",
        plan.len()
    );
    plan
}

/// [`build_plan`] over a [`DateRange`].
#[must_use]
pub fn build_plan_for(catalogue: &Catalogue, range: &DateRange) -> Vec<PlanDay> {
    build_plan(catalogue, range.start, range.end)
}

/// [`build_plan`] over `YYYY-MM-DD` strings.
///
/// # Errors
///
/// Returns `DateParseError` if either date is malformed. A well-formed but
/// inverted range is not an error.
pub fn build_plan_iso(
    catalogue: &Catalogue,
    start: &str,
    end: &str,
) -> Result<Vec<PlanDay>, DateParseError> {
    let range = DateRange::parse_iso(start, end)?;
    Ok(build_plan_for(catalogue, &range))
}

/// The plan day scheduled for `today`, if the plan covers it.
#[must_use]
pub fn find_today(plan: &[PlanDay], today: NaiveDate) -> Option<&PlanDay> {
    plan.iter().find(|day| day.date == today)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, StudyItem};
    use std::collections::HashSet;

    fn catalogue_with(count: usize) -> Catalogue {
        // Spread across uneven categories to exercise flattening.
        let mut categories = Vec::new();
        let mut next = 0;
        let mut size = 1;
        while next < count {
            let take = size.min(count - next);
            let items = (next..next + take).map(|i| StudyItem::new(format!("item-{i}").as_str(), "t"));
            categories.push(Category::new(format!("cat-{next}").as_str(), "Category", items));
            next += take;
            size += 1;
        }
        Catalogue::new(categories).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    fn sizes(plan: &[PlanDay]) -> Vec<usize> {
        plan.iter().map(PlanDay::len).collect()
    }

    #[test]
    fn inverted_range_is_empty() {
        let plan = build_plan_iso(&catalogue_with(5), "2026-01-10", "2026-01-09").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn single_day_holds_everything() {
        let catalogue = catalogue_with(7);
        let plan = build_plan_iso(&catalogue, "2026-01-10", "2026-01-10").unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].day, 1);
        assert_eq!(plan[0].date, date("2026-01-10"));
        assert_eq!(plan[0].label, "Focus Area 1");
        assert_eq!(plan[0].item_ids, catalogue.flatten_ids());
    }

    #[test]
    fn empty_catalogue_is_empty_for_valid_range() {
        let plan = build_plan_iso(&Catalogue::default(), "2026-01-01", "2026-01-05").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn uneven_split_front_loads_days() {
        // 7 items over 3 days: ceil(7/3) = 3 per day.
        let plan = build_plan(&catalogue_with(7), date("2026-01-01"), date("2026-01-03"));
        assert_eq!(sizes(&plan), [3, 3, 1]);
        assert_eq!(plan[2].date, date("2026-01-03"));
        assert_eq!(plan[2].label, "Focus Area 3");
    }

    #[test]
    fn long_range_drops_trailing_days() {
        // 5 items over 10 days: one per day, days 6..10 absent.
        let plan = build_plan(&catalogue_with(5), date("2026-01-01"), date("2026-01-10"));
        assert_eq!(sizes(&plan), [1, 1, 1, 1, 1]);
        assert_eq!(plan.last().unwrap().day, 5);
    }

    #[test]
    fn early_exhaustion_leaves_gap_days_absent() {
        // 10 items over 4 days: ceil(10/4) = 3 → 3,3,3,1.
        let plan = build_plan(&catalogue_with(10), date("2026-01-01"), date("2026-01-04"));
        assert_eq!(sizes(&plan), [3, 3, 3, 1]);

        // 9 items over 4 days: ceil(9/4) = 3 → only three days are needed.
        let plan = build_plan(&catalogue_with(9), date("2026-01-01"), date("2026-01-04"));
        assert_eq!(sizes(&plan), [3, 3, 3]);
    }

    #[test]
    fn span_is_capped_at_sixty_days() {
        let start = date("2026-01-01");
        let end = date("2026-12-31");
        assert_eq!(DateRange::new(start, end).span_days(), Some(MAX_PLAN_DAYS));

        let plan = build_plan(&catalogue_with(500), start, end);
        assert!(plan.len() <= MAX_PLAN_DAYS);
        // ceil(500/60) = 9 per day → 56 days.
        assert_eq!(plan.len(), 56);
        assert_eq!(plan[0].len(), 9);

        let plan = build_plan(&catalogue_with(120), start, end);
        assert_eq!(plan.len(), 60);
        assert_eq!(plan.last().unwrap().date, date("2026-03-01"));
    }

    #[test]
    fn dates_cross_month_boundaries() {
        let plan = build_plan(&catalogue_with(4), date("2026-01-30"), date("2026-02-02"));
        let dates: Vec<String> = plan.iter().map(PlanDay::display_date).collect();
        assert_eq!(dates, ["Jan 30", "Jan 31", "Feb 01", "Feb 02"]);
    }

    #[test]
    fn plan_is_a_partition_of_the_catalogue() {
        let start = date("2026-03-01");
        for count in [0, 1, 2, 7, 29, 61, 200] {
            let catalogue = catalogue_with(count);
            for span in [0_u64, 1, 2, 5, 29, 59, 60, 61, 400] {
                let end = start.checked_add_days(Days::new(span)).unwrap();
                let plan = build_plan(&catalogue, start, end);

                let flattened: Vec<ItemId> =
                    plan.iter().flat_map(|d| d.item_ids.iter().cloned()).collect();
                assert_eq!(flattened, catalogue.flatten_ids(), "count={count} span={span}");

                let unique: HashSet<_> = flattened.iter().collect();
                assert_eq!(unique.len(), count);
                assert!(plan.iter().all(|d| !d.is_empty()));
                assert!(plan.len() <= MAX_PLAN_DAYS);
                for (idx, day) in plan.iter().enumerate() {
                    assert_eq!(day.day, idx + 1);
                }
            }
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let catalogue = catalogue_with(29);
        let a = build_plan_iso(&catalogue, "2026-01-01", "2026-01-11").unwrap();
        let b = build_plan_iso(&catalogue, "2026-01-01", "2026-01-11").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_dates_are_reported() {
        let err = build_plan_iso(&catalogue_with(3), "2026-01-01", "soon").unwrap_err();
        assert_eq!(err.raw(), "soon");
    }

    #[test]
    fn find_today_matches_calendar_date() {
        let plan = build_plan(&catalogue_with(6), date("2026-01-01"), date("2026-01-03"));
        assert_eq!(find_today(&plan, date("2026-01-02")).map(|d| d.day), Some(2));
        assert!(find_today(&plan, date("2026-01-04")).is_none());
    }
}
