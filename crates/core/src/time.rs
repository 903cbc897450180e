use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use thiserror::Error;

/// Wire format for calendar dates exchanged with callers and storage.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Returns the current calendar date.
    ///
    /// The real clock uses the local calendar; a fixed clock uses the UTC date
    /// of its timestamp so tests do not depend on the host timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Default => Local::now().date_naive(),
            Clock::Fixed(t) => t.date_naive(),
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid date `{raw}`: expected YYYY-MM-DD")]
pub struct DateParseError {
    raw: String,
}

impl DateParseError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DateParseError` if the input is not a valid ISO-8601 calendar date.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT).map_err(|_| DateParseError {
        raw: raw.to_owned(),
    })
}

/// Formats a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Calendar date of [`fixed_now`] (2023-11-14).
#[must_use]
pub fn fixed_today() -> NaiveDate {
    fixed_now().date_naive()
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let date = parse_iso_date("2026-01-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
        assert_eq!(format_iso_date(date), "2026-01-10");
    }

    #[test]
    fn parse_trims_whitespace() {
        assert!(parse_iso_date(" 2026-02-01 ").is_ok());
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = parse_iso_date("2026-13-01").unwrap_err();
        assert_eq!(err.raw(), "2026-13-01");
        assert!(parse_iso_date("10/01/2026").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn fixed_clock_reports_fixed_day_and_advances() {
        let mut clock = fixed_clock();
        assert!(clock.is_fixed());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        clock.advance(Duration::days(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2023, 11, 16).unwrap());
    }
}
