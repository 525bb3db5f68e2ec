//! Break policy configuration and the evaluation UTC offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Worked time after which the first statutory break is owed.
pub const STATUTORY_FIRST_THRESHOLD: Duration = Duration::hours(6);

/// Worked time after which the second statutory break is owed.
pub const STATUTORY_SECOND_THRESHOLD: Duration = Duration::hours(9);

/// Break owed past the first threshold.
pub const STATUTORY_FIRST_BREAK: Duration = Duration::minutes(30);

/// Break owed past the second threshold (replaces the first one).
pub const STATUTORY_SECOND_BREAK: Duration = Duration::minutes(45);

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Invalid policy values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    /// A duration setting was negative.
    #[error("{field} cannot be negative")]
    NegativeDuration { field: &'static str },

    /// The maximum daily duration is shorter than the target.
    #[error("maximum daily duration ({max_minutes}m) is below the target ({target_minutes}m)")]
    MaxBelowTarget {
        target_minutes: i64,
        max_minutes: i64,
    },

    /// The fixed break time is not a time of day.
    #[error("break hour must be between 0 and 24, got {value}")]
    BreakHourOutOfRange { value: f64 },

    /// The fixed break would run past midnight.
    #[error("break at hour {at_hours} lasting {length_minutes}m ends after midnight")]
    BreakPastMidnight { at_hours: f64, length_minutes: i64 },
}

/// Signed offset from UTC in minutes (time zone plus daylight saving).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtcOffset(i32);

impl UtcOffset {
    /// Zero offset.
    pub const UTC: Self = Self(0);

    pub const fn from_minutes(minutes: i32) -> Self {
        Self(minutes)
    }

    pub const fn minutes(self) -> i32 {
        self.0
    }

    /// The offset as a chrono `FixedOffset`, falling back to UTC when out of range.
    pub fn fixed(self) -> FixedOffset {
        FixedOffset::east_opt(self.0 * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Local minute of day (`0..1440`) of an instant; seconds are truncated.
    pub fn minute_of_day(self, instant: DateTime<Utc>) -> i64 {
        let local = instant.with_timezone(&self.fixed());
        i64::from(local.num_seconds_from_midnight() / 60) % MINUTES_PER_DAY
    }

    /// Local calendar date of an instant.
    pub fn local_date(self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.fixed()).date_naive()
    }

    /// Converts a local wall-clock time into an instant.
    pub fn to_instant(self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - Duration::minutes(i64::from(self.0))).and_utc()
    }
}

/// How breaks are deducted from a work session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakMode {
    /// 30 minutes after 6 hours, 45 minutes after 9 hours.
    Statutory,
    /// A single break of `length` once worked time exceeds `after`.
    AfterHours { after: Duration, length: Duration },
    /// A single break of `length` starting at a wall-clock time.
    FixedClock {
        /// Hours since local midnight, may be fractional (12.5 = 12:30).
        at_hours: f64,
        length: Duration,
    },
}

impl BreakMode {
    /// Selects the mode from the two-switch settings representation.
    ///
    /// `individual = false` means statutory breaks regardless of the other values.
    pub fn from_flags(
        individual: bool,
        after_hours_enabled: bool,
        after: Duration,
        at_hours: f64,
        length: Duration,
    ) -> Self {
        match (individual, after_hours_enabled) {
            (false, _) => Self::Statutory,
            (true, true) => Self::AfterHours { after, length },
            (true, false) => Self::FixedClock { at_hours, length },
        }
    }
}

/// A fixed-clock break window in local minutes of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BreakWindow {
    pub start: i64,
    pub end: i64,
}

impl BreakWindow {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(at_hours: f64, length: Duration) -> Self {
        let start = (at_hours * 60.0) as i64;
        Self {
            start,
            end: start + length.num_minutes(),
        }
    }

    /// True if `minute` lies strictly between the window's start and end.
    pub(crate) const fn strictly_contains(self, minute: i64) -> bool {
        minute > self.start && minute < self.end
    }
}

/// Read-only configuration for the rule engine.
///
/// Values are not validated by the engine; callers that accept user input
/// should run [`BreakPolicy::validate`] once after loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakPolicy {
    /// Worked time expected per day.
    pub target: Duration,
    /// Maximum worked time allowed per day.
    pub max: Duration,
    pub mode: BreakMode,
    /// Remote sessions owe no breaks.
    pub skip_breaks_remote: bool,
    /// Offset used to place instants on the local clock and calendar.
    pub utc_offset: UtcOffset,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            target: Duration::hours(8),
            max: Duration::hours(10),
            mode: BreakMode::Statutory,
            skip_breaks_remote: true,
            utc_offset: UtcOffset::UTC,
        }
    }
}

impl BreakPolicy {
    /// Returns a copy evaluated at a different UTC offset.
    #[must_use]
    pub fn with_offset(mut self, utc_offset: UtcOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Checks the preconditions the engine relies on.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let zero = Duration::zero();
        if self.target < zero {
            return Err(PolicyError::NegativeDuration { field: "target" });
        }
        if self.max < zero {
            return Err(PolicyError::NegativeDuration { field: "max" });
        }
        if self.max < self.target {
            return Err(PolicyError::MaxBelowTarget {
                target_minutes: self.target.num_minutes(),
                max_minutes: self.max.num_minutes(),
            });
        }
        match self.mode {
            BreakMode::Statutory => {}
            BreakMode::AfterHours { after, length } => {
                if after < zero {
                    return Err(PolicyError::NegativeDuration { field: "break_after" });
                }
                if length < zero {
                    return Err(PolicyError::NegativeDuration { field: "break_length" });
                }
            }
            BreakMode::FixedClock { at_hours, length } => {
                if !(0.0..24.0).contains(&at_hours) {
                    return Err(PolicyError::BreakHourOutOfRange { value: at_hours });
                }
                if length < zero {
                    return Err(PolicyError::NegativeDuration { field: "break_length" });
                }
                // Minutes of day wrap at midnight, a window must not.
                if BreakWindow::new(at_hours, length).end > MINUTES_PER_DAY {
                    return Err(PolicyError::BreakPastMidnight {
                        at_hours,
                        length_minutes: length.num_minutes(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn from_flags_selects_statutory_when_not_individual() {
        let mode = BreakMode::from_flags(
            false,
            false,
            Duration::hours(4),
            12.0,
            Duration::minutes(30),
        );
        assert_eq!(mode, BreakMode::Statutory);
    }

    #[test]
    fn from_flags_selects_after_hours_and_fixed_clock() {
        let after = Duration::hours(4);
        let length = Duration::minutes(30);
        assert_eq!(
            BreakMode::from_flags(true, true, after, 12.0, length),
            BreakMode::AfterHours { after, length }
        );
        assert_eq!(
            BreakMode::from_flags(true, false, after, 12.0, length),
            BreakMode::FixedClock {
                at_hours: 12.0,
                length
            }
        );
    }

    #[test]
    fn minute_of_day_applies_offset_and_wraps() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 29, 23, 30, 45).unwrap();
        assert_eq!(UtcOffset::UTC.minute_of_day(instant), 23 * 60 + 30);
        // 23:30 UTC is 00:30 the next day at +01:00
        assert_eq!(UtcOffset::from_minutes(60).minute_of_day(instant), 30);
        assert_eq!(
            UtcOffset::from_minutes(60).local_date(instant),
            NaiveDate::from_ymd_opt(2025, 1, 30).unwrap()
        );
    }

    #[test]
    fn to_instant_inverts_offset() {
        let local = NaiveDate::from_ymd_opt(2025, 1, 29)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let offset = UtcOffset::from_minutes(120);
        assert_eq!(
            offset.to_instant(local),
            Utc.with_ymd_and_hms(2025, 1, 29, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        assert_eq!(UtcOffset::from_minutes(48 * 60).fixed(), Utc.fix());
    }

    #[test]
    fn break_window_from_fractional_hours() {
        let window = BreakWindow::new(12.5, Duration::minutes(45));
        assert_eq!(window.start, 750);
        assert_eq!(window.end, 795);
        assert!(window.strictly_contains(751));
        assert!(!window.strictly_contains(750));
        assert!(!window.strictly_contains(795));
    }

    #[test]
    fn default_policy_is_valid() {
        assert_eq!(BreakPolicy::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_max_below_target() {
        let policy = BreakPolicy {
            max: Duration::hours(6),
            ..BreakPolicy::default()
        };
        assert_eq!(
            policy.validate(),
            Err(PolicyError::MaxBelowTarget {
                target_minutes: 480,
                max_minutes: 360
            })
        );
    }

    #[test]
    fn validate_rejects_bad_break_settings() {
        let negative = BreakPolicy {
            mode: BreakMode::AfterHours {
                after: Duration::hours(4),
                length: Duration::minutes(-5),
            },
            ..BreakPolicy::default()
        };
        assert_eq!(
            negative.validate(),
            Err(PolicyError::NegativeDuration {
                field: "break_length"
            })
        );

        let late = BreakPolicy {
            mode: BreakMode::FixedClock {
                at_hours: 25.0,
                length: Duration::minutes(30),
            },
            ..BreakPolicy::default()
        };
        assert_eq!(
            late.validate(),
            Err(PolicyError::BreakHourOutOfRange { value: 25.0 })
        );
    }

    #[test]
    fn validate_rejects_break_window_past_midnight() {
        let fixed = |at_hours: f64, minutes: i64| BreakPolicy {
            mode: BreakMode::FixedClock {
                at_hours,
                length: Duration::minutes(minutes),
            },
            ..BreakPolicy::default()
        };

        assert_eq!(
            fixed(23.75, 30).validate(),
            Err(PolicyError::BreakPastMidnight {
                at_hours: 23.75,
                length_minutes: 30
            })
        );
        // Ending exactly at midnight is fine
        assert_eq!(fixed(23.5, 30).validate(), Ok(()));
    }
}
