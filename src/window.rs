//! Planning window calculation.
//!
//! The sync window always reaches the end of the current calendar month.
//! Near the end of a month that window would shrink to a few days and
//! events just past month-end would flap in and out of the mirrored set,
//! so below a threshold the window extends through the following month.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Days remaining in the current month below which the window also covers
/// the next month.
pub const DEFAULT_EXTENSION_THRESHOLD_DAYS: u32 = 21;

/// Forward-looking date range considered for synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PlanningWindow {
    /// Window starting at `now`, sized by [`planned_day_count`].
    pub fn starting(now: DateTime<Utc>, extension_threshold: u32) -> Self {
        let days = planned_day_count(now.date_naive(), extension_threshold);
        PlanningWindow {
            start: now,
            end: now + Duration::days(i64::from(days)),
        }
    }

    /// Whether a half-open `[start, end)` range intersects this window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Number of days ahead to synchronize, counted from `today`.
///
/// Days through the end of the current month (inclusive), extended by the
/// full next month when the remainder falls below `extension_threshold`.
/// Always at least 1.
pub fn planned_day_count(today: NaiveDate, extension_threshold: u32) -> u32 {
    let last_day = last_day_of_month(today);
    let mut days = (last_day - today).num_days() as u32 + 1;

    if days < extension_threshold {
        days += last_day_of_month(first_of_next_month(today)).day();
    }

    days
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // The first of a month always exists
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    first_of_next_month(date).pred_opt().unwrap()
}
