//! Calendar ranges and period aggregation.
//!
//! Several work intervals may fall on the same calendar day. Break
//! deductions are applied per interval, but overtime is measured against the
//! summed day total, so a day split into two sessions is judged the same way
//! as one continuous session of the same length.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};

use crate::interval::WorkInterval;
use crate::policy::BreakPolicy;
use crate::rules::worked_time;

/// Aggregated statistics for a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodTotals {
    /// Worked time over all days.
    pub worked_time: Duration,
    /// Sum of the per-day overtime (signed).
    pub over_time: Duration,
    /// Per-day overtime bucketed by weekday, index 0 = Sunday.
    pub per_weekday_over_time: [Duration; 7],
}

impl PeriodTotals {
    /// Overtime accumulated on the given weekday.
    pub fn over_time_on(&self, weekday: Weekday) -> Duration {
        self.per_weekday_over_time[weekday.num_days_from_sunday() as usize]
    }

    fn close_day(&mut self, day: NaiveDate, worked: Duration, target: Duration) {
        let over = worked - target;
        self.worked_time += worked;
        self.over_time += over;
        self.per_weekday_over_time[day.weekday().num_days_from_sunday() as usize] += over;
        tracing::trace!(%day, worked_min = worked.num_minutes(), over_min = over.num_minutes(), "closed day");
    }
}

/// Week containing `anchor`: `[Sunday 00:00, next Sunday 00:00)`.
///
/// Weeks start on Sunday. See [`display_week_number`] for the number shown
/// to users.
pub fn calendar_week_range(anchor: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let sunday = anchor - Duration::days(i64::from(anchor.weekday().num_days_from_sunday()));
    let start = sunday.and_time(NaiveTime::MIN);
    (start, start + Duration::days(7))
}

/// Calendar week number for a week starting at `week_start` (a Sunday).
///
/// One day is added first so the number is the ISO week of the Monday that
/// follows.
pub fn display_week_number(week_start: NaiveDateTime) -> u32 {
    (week_start + Duration::days(1)).iso_week().week()
}

/// Month containing `anchor`: `[first 00:00, last 23:59]`.
///
/// The end is inclusive, unlike [`calendar_week_range`].
pub fn calendar_month_range(anchor: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let first = anchor - Duration::days(i64::from(anchor.day0()));
    let last = first + Months::new(1) - Duration::days(1);
    let start = first.and_time(NaiveTime::MIN);
    let end = last.and_time(NaiveTime::MIN) + Duration::minutes(23 * 60 + 59);
    (start, end)
}

/// Local calendar day containing `anchor`: `[00:00, next day 00:00)`.
pub fn calendar_day_range(anchor: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = anchor.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Sum of the worked time of each interval, break rules applied per interval.
pub fn day_worked_time(intervals: &[WorkInterval], policy: &BreakPolicy) -> Duration {
    intervals
        .iter()
        .map(|interval| worked_time(interval, policy))
        .sum()
}

/// Aggregates intervals into period totals.
///
/// `intervals` must be sorted ascending by start. Intervals starting outside
/// `[range_start, range_end]` are ignored. Days are grouped by the local
/// calendar date of each interval's start in `policy.utc_offset`.
pub fn aggregate(
    intervals: &[WorkInterval],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    policy: &BreakPolicy,
) -> PeriodTotals {
    let offset = policy.utc_offset;
    let mut totals = PeriodTotals::default();
    let mut worked_per_day = Duration::zero();

    let mut in_range = intervals
        .iter()
        .filter(|interval| interval.start >= range_start && interval.start <= range_end)
        .peekable();

    while let Some(interval) = in_range.next() {
        worked_per_day += worked_time(interval, policy);

        let day = offset.local_date(interval.start);
        let is_last_of_day = in_range
            .peek()
            .is_none_or(|next| offset.local_date(next.start) != day);
        if is_last_of_day {
            totals.close_day(day, worked_per_day, policy.target);
            worked_per_day = Duration::zero();
        }
    }

    totals
}
