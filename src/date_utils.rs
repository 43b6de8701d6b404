// ABOUTME: Date helpers for default report windows and date coverage summaries
// ABOUTME: Human readable "first to last (coverage%)" strings over lists of report dates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

/// First date, last date and share of days present in between
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateCoverage {
    /// Earliest date
    pub first: NaiveDate,
    /// Latest date
    pub last: NaiveDate,
    /// Calendar days from `first` to `last`, inclusive
    pub days: i64,
    /// Distinct dates divided by `days`
    pub coverage: f64,
}

/// Coverage of a list of dates; `None` when the list is empty
#[must_use]
pub fn coverage(dates: &[NaiveDate]) -> Option<DateCoverage> {
    let distinct: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let first = *distinct.first()?;
    let last = *distinct.last()?;
    let days = (last - first).num_days() + 1;
    Some(DateCoverage {
        first,
        last,
        days,
        coverage: distinct.len() as f64 / days as f64,
    })
}

/// `YYYY-MM-DD to YYYY-MM-DD (NN%)`, a single date, or `alternate` when empty
#[must_use]
pub fn date_range_string(dates: &[NaiveDate], alternate: &str) -> String {
    match coverage(dates) {
        None => alternate.to_owned(),
        Some(c) if c.first == c.last => c.first.format("%Y-%m-%d").to_string(),
        Some(c) => format!(
            "{} to {} ({:.0}%)",
            c.first.format("%Y-%m-%d"),
            c.last.format("%Y-%m-%d"),
            100.0 * c.coverage
        ),
    }
}

/// `day` moved back by `days`, saturating at the earliest representable date
#[must_use]
pub fn days_before(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_sub_days(Days::new(days.unsigned_abs()))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_empty_uses_alternate() {
        assert_eq!(date_range_string(&[], "no dates"), "no dates");
    }

    #[test]
    fn test_single_date() {
        assert_eq!(date_range_string(&[day(4), day(4)], ""), "2024-05-04");
    }

    #[test]
    fn test_range_with_gap() {
        let dates = [day(1), day(2), day(4), day(5)];
        assert_eq!(date_range_string(&dates, ""), "2024-05-01 to 2024-05-05 (80%)");
    }

    #[test]
    fn test_days_before() {
        assert_eq!(days_before(day(10), 3), day(7));
    }
}
