//! Break rules.
//!
//! Converts a work interval and a [`BreakPolicy`] into worked time and
//! overtime, and projects when a session reaches the daily target and the
//! daily maximum.
//!
//! All functions are pure: no clock reads, no I/O.

use chrono::{DateTime, Duration, Utc};

use crate::interval::WorkInterval;
use crate::policy::{
    BreakMode, BreakPolicy, BreakWindow, STATUTORY_FIRST_BREAK, STATUTORY_FIRST_THRESHOLD,
    STATUTORY_SECOND_BREAK, STATUTORY_SECOND_THRESHOLD,
};

/// How a session's endpoints sit relative to a fixed-clock break window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowOverlap {
    /// The session covers the whole window.
    Full,
    /// The session starts inside the window and ends after it.
    StartInside,
    /// The session starts before the window and ends inside it.
    EndInside,
    /// Both endpoints lie inside the window.
    WithinWindow,
    None,
}

impl WindowOverlap {
    const fn classify(window: BreakWindow, start_minute: i64, end_minute: i64) -> Self {
        let start_inside = window.strictly_contains(start_minute);
        let end_inside = window.strictly_contains(end_minute);
        match (start_inside, end_inside) {
            (true, true) => Self::WithinWindow,
            (true, false) => Self::StartInside,
            (false, true) => Self::EndInside,
            (false, false) => {
                if start_minute <= window.start && end_minute >= window.end {
                    Self::Full
                } else {
                    Self::None
                }
            }
        }
    }
}

/// Which projected end to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndGoal {
    Normal,
    Max,
}

/// Worked time of a session after break deductions.
///
/// The result is never negative and never exceeds the raw interval length.
/// An interval without an end counts as zero.
pub fn worked_time(interval: &WorkInterval, policy: &BreakPolicy) -> Duration {
    let raw = interval.raw_duration();
    if interval.is_remote && policy.skip_breaks_remote {
        return raw;
    }

    match policy.mode {
        BreakMode::Statutory => statutory_worked_time(raw),
        BreakMode::AfterHours { after, length } => after_hours_worked_time(raw, after, length),
        BreakMode::FixedClock { at_hours, length } => {
            let Some(end) = interval.end else {
                return raw;
            };
            let window = BreakWindow::new(at_hours, length);
            let offset = policy.utc_offset;
            let overlap = WindowOverlap::classify(
                window,
                offset.minute_of_day(interval.start),
                offset.minute_of_day(end),
            );
            let deduction = match overlap {
                WindowOverlap::Full => length,
                WindowOverlap::StartInside => {
                    Duration::minutes(window.end - offset.minute_of_day(interval.start))
                }
                WindowOverlap::EndInside => {
                    Duration::minutes(offset.minute_of_day(end) - window.start)
                }
                WindowOverlap::WithinWindow => raw,
                WindowOverlap::None => Duration::zero(),
            };
            (raw - deduction).max(Duration::zero())
        }
    }
}

/// Overtime of a session: worked time minus the daily target. Negative means undertime.
pub fn over_time(interval: &WorkInterval, policy: &BreakPolicy) -> Duration {
    worked_time(interval, policy) - policy.target
}

/// Instant at which a session starting at `start` reaches the daily target.
///
/// `carried` is the time already worked earlier the same day.
pub fn normal_end_time(
    start: DateTime<Utc>,
    carried: Duration,
    is_remote: bool,
    policy: &BreakPolicy,
) -> DateTime<Utc> {
    projected_end(start, carried, is_remote, policy, EndGoal::Normal)
}

/// Instant at which a session starting at `start` reaches the daily maximum.
///
/// `carried` is the time already worked earlier the same day.
pub fn max_end_time(
    start: DateTime<Utc>,
    carried: Duration,
    is_remote: bool,
    policy: &BreakPolicy,
) -> DateTime<Utc> {
    projected_end(start, carried, is_remote, policy, EndGoal::Max)
}

fn projected_end(
    start: DateTime<Utc>,
    carried: Duration,
    is_remote: bool,
    policy: &BreakPolicy,
    goal: EndGoal,
) -> DateTime<Utc> {
    let span = match goal {
        EndGoal::Normal => policy.target,
        EndGoal::Max => policy.max,
    };
    let end = start + span - carried;
    if is_remote && policy.skip_breaks_remote {
        return end;
    }

    let pending_break = match policy.mode {
        BreakMode::Statutory => match goal {
            EndGoal::Normal if policy.target < STATUTORY_SECOND_THRESHOLD => STATUTORY_FIRST_BREAK,
            EndGoal::Normal | EndGoal::Max => STATUTORY_SECOND_BREAK,
        },
        BreakMode::AfterHours { after, length } => {
            if span > after {
                length
            } else {
                Duration::zero()
            }
        }
        BreakMode::FixedClock { at_hours, length } => {
            let window = BreakWindow::new(at_hours, length);
            let start_minute = policy.utc_offset.minute_of_day(start);
            if window.strictly_contains(start_minute) {
                Duration::minutes(window.end - start_minute)
            } else if start_minute <= window.start {
                length
            } else {
                Duration::zero()
            }
        }
    };
    end + pending_break
}

/// Two-tier statutory deduction: 30 minutes past 6 hours, 45 past 9.
///
/// Time inside a break is never counted, so a session that ends during a
/// break clamps to the threshold instead of losing the whole break.
fn statutory_worked_time(raw: Duration) -> Duration {
    let mut worked = raw;
    if worked > STATUTORY_FIRST_THRESHOLD {
        if worked < STATUTORY_FIRST_THRESHOLD + STATUTORY_FIRST_BREAK {
            worked = STATUTORY_FIRST_THRESHOLD;
        } else {
            worked -= STATUTORY_FIRST_BREAK;
        }

        let extra_break = STATUTORY_SECOND_BREAK - STATUTORY_FIRST_BREAK;
        if worked > STATUTORY_SECOND_THRESHOLD + extra_break {
            worked -= extra_break;
        } else if worked > STATUTORY_SECOND_THRESHOLD {
            worked = STATUTORY_SECOND_THRESHOLD;
        }
    }
    worked
}

fn after_hours_worked_time(raw: Duration, after: Duration, length: Duration) -> Duration {
    if raw > after + length {
        raw - length
    } else if raw > after {
        after
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::UtcOffset;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, hour, minute, 0).unwrap()
    }

    fn session(start: DateTime<Utc>, length: Duration) -> WorkInterval {
        WorkInterval::new(start, start + length, false)
    }

    fn hm(hours: i64, minutes: i64) -> Duration {
        Duration::hours(hours) + Duration::minutes(minutes)
    }

    fn statutory() -> BreakPolicy {
        BreakPolicy::default()
    }

    fn after_hours(after: Duration, length: Duration) -> BreakPolicy {
        BreakPolicy {
            mode: BreakMode::AfterHours { after, length },
            ..BreakPolicy::default()
        }
    }

    fn fixed_clock(at_hours: f64, length: Duration) -> BreakPolicy {
        BreakPolicy {
            mode: BreakMode::FixedClock { at_hours, length },
            ..BreakPolicy::default()
        }
    }

    // ========== Statutory Mode ==========

    #[test]
    fn statutory_no_break_below_six_hours() {
        let worked = worked_time(&session(at(8, 0), hm(5, 59)), &statutory());
        assert_eq!(worked, hm(5, 59));
    }

    #[test]
    fn statutory_exactly_six_hours_is_untouched() {
        let worked = worked_time(&session(at(8, 0), hm(6, 0)), &statutory());
        assert_eq!(worked, hm(6, 0));
    }

    #[test]
    fn statutory_clamps_to_six_hours_inside_first_break() {
        for minutes in [1, 15, 29] {
            let worked = worked_time(&session(at(8, 0), hm(6, minutes)), &statutory());
            assert_eq!(worked, hm(6, 0), "raw 6h{minutes:02}m");
        }
    }

    #[test]
    fn statutory_subtracts_first_break_after_six_thirty() {
        assert_eq!(
            worked_time(&session(at(8, 0), hm(6, 30)), &statutory()),
            hm(6, 0)
        );
        assert_eq!(
            worked_time(&session(at(8, 0), hm(8, 0)), &statutory()),
            hm(7, 30)
        );
    }

    #[test]
    fn statutory_clamps_to_nine_hours_inside_second_break() {
        // raw 9h40m -> 9h10m after first break -> clamped to 9h
        let worked = worked_time(&session(at(7, 0), hm(9, 40)), &statutory());
        assert_eq!(worked, hm(9, 0));
    }

    #[test]
    fn statutory_second_break_replaces_first() {
        // raw 9h30m -> 9h00m after 30m break, not above 9h so untouched
        assert_eq!(
            worked_time(&session(at(7, 0), hm(9, 30)), &statutory()),
            hm(9, 0)
        );
        // raw 10h -> 45m total deduction
        assert_eq!(
            worked_time(&session(at(7, 0), hm(10, 0)), &statutory()),
            hm(9, 15)
        );
    }

    // ========== After-Hours Mode ==========

    #[test]
    fn after_hours_clamps_inside_break() {
        let policy = after_hours(Duration::hours(4), Duration::minutes(30));
        assert_eq!(worked_time(&session(at(8, 0), hm(4, 15)), &policy), hm(4, 0));
    }

    #[test]
    fn after_hours_subtracts_break_once_past_it() {
        let policy = after_hours(Duration::hours(4), Duration::minutes(30));
        assert_eq!(
            worked_time(&session(at(8, 0), hm(4, 45)), &policy),
            hm(4, 15)
        );
    }

    #[test]
    fn after_hours_below_threshold_is_untouched() {
        let policy = after_hours(Duration::hours(4), Duration::minutes(30));
        assert_eq!(worked_time(&session(at(8, 0), hm(3, 59)), &policy), hm(3, 59));
        assert_eq!(worked_time(&session(at(8, 0), hm(4, 0)), &policy), hm(4, 0));
    }

    // ========== Fixed-Clock Mode ==========

    #[test]
    fn fixed_clock_session_spanning_window_loses_full_break() {
        let policy = fixed_clock(12.0, Duration::minutes(30));
        let interval = WorkInterval::new(at(11, 0), at(13, 0), false);
        assert_eq!(worked_time(&interval, &policy), hm(1, 30));
    }

    #[test]
    fn fixed_clock_session_starting_inside_window() {
        let policy = fixed_clock(12.0, Duration::minutes(30));
        let interval = WorkInterval::new(at(12, 15), at(14, 0), false);
        assert_eq!(worked_time(&interval, &policy), hm(1, 30));
    }

    #[test]
    fn fixed_clock_session_ending_inside_window() {
        let policy = fixed_clock(12.0, Duration::minutes(30));
        let interval = WorkInterval::new(at(10, 0), at(12, 15), false);
        assert_eq!(worked_time(&interval, &policy), hm(2, 0));
    }

    #[test]
    fn fixed_clock_session_outside_window() {
        let policy = fixed_clock(12.0, Duration::minutes(30));
        let interval = WorkInterval::new(at(8, 0), at(9, 0), false);
        assert_eq!(worked_time(&interval, &policy), hm(1, 0));
    }

    #[test]
    fn fixed_clock_session_touching_window_edges() {
        let policy = fixed_clock(12.0, Duration::minutes(30));
        // Ends exactly when the break starts
        let before = WorkInterval::new(at(10, 0), at(12, 0), false);
        assert_eq!(worked_time(&before, &policy), hm(2, 0));
        // Starts exactly when the break ends
        let after = WorkInterval::new(at(12, 30), at(14, 0), false);
        assert_eq!(worked_time(&after, &policy), hm(1, 30));
        // Starts exactly at the break and runs past it
        let from_start = WorkInterval::new(at(12, 0), at(13, 0), false);
        assert_eq!(worked_time(&from_start, &policy), hm(0, 30));
    }

    #[test]
    fn fixed_clock_session_within_window_counts_nothing() {
        let policy = fixed_clock(12.0, Duration::minutes(30));
        let interval = WorkInterval::new(at(12, 5), at(12, 20), false);
        assert_eq!(worked_time(&interval, &policy), Duration::zero());
    }

    #[test]
    fn fixed_clock_uses_utc_offset() {
        // 11:00-13:00 local at +02:00 is 09:00-11:00 UTC
        let policy = fixed_clock(12.0, Duration::minutes(30)).with_offset(UtcOffset::from_minutes(120));
        let interval = WorkInterval::new(at(9, 0), at(11, 0), false);
        assert_eq!(worked_time(&interval, &policy), hm(1, 30));

        // The same instants seen in UTC do not touch the window
        let utc_policy = fixed_clock(12.0, Duration::minutes(30));
        assert_eq!(worked_time(&interval, &utc_policy), hm(2, 0));
    }

    #[test]
    fn fixed_clock_fractional_break_hour() {
        let policy = fixed_clock(12.5, Duration::minutes(45));
        let interval = WorkInterval::new(at(12, 45), at(15, 0), false);
        // window 12:30-13:15, start inside: lose 30 minutes
        assert_eq!(worked_time(&interval, &policy), hm(1, 45));
    }

    // ========== Shared Properties ==========

    #[test]
    fn remote_session_skips_breaks_in_every_mode() {
        let policies = [
            statutory(),
            after_hours(Duration::hours(4), Duration::minutes(30)),
            fixed_clock(12.0, Duration::minutes(30)),
        ];
        let interval = WorkInterval::new(at(8, 0), at(18, 0), true);
        for policy in &policies {
            assert_eq!(worked_time(&interval, policy), hm(10, 0), "{:?}", policy.mode);
        }
    }

    #[test]
    fn remote_session_owes_breaks_when_skipping_disabled() {
        let policy = BreakPolicy {
            skip_breaks_remote: false,
            ..statutory()
        };
        let interval = WorkInterval::new(at(8, 0), at(16, 0), true);
        assert_eq!(worked_time(&interval, &policy), hm(7, 30));
    }

    #[test]
    fn reversed_and_open_intervals_count_zero() {
        let reversed = WorkInterval::new(at(16, 0), at(8, 0), false);
        let open = WorkInterval::open(at(8, 0), false);
        let policies = [
            statutory(),
            after_hours(Duration::hours(4), Duration::minutes(30)),
            fixed_clock(12.0, Duration::minutes(30)),
        ];
        for policy in &policies {
            assert_eq!(worked_time(&reversed, policy), Duration::zero());
            assert_eq!(worked_time(&open, policy), Duration::zero());
        }
    }

    #[test]
    fn worked_time_is_bounded_by_raw_duration() {
        let policies = [
            statutory(),
            after_hours(Duration::hours(4), Duration::minutes(30)),
            fixed_clock(12.0, Duration::minutes(30)),
        ];
        for policy in &policies {
            for minutes in (0..=14 * 60).step_by(7) {
                let interval = session(at(6, 0), Duration::minutes(minutes));
                let worked = worked_time(&interval, policy);
                assert!(worked >= Duration::zero());
                assert!(worked <= interval.raw_duration());
                assert_eq!(worked, worked_time(&interval, policy));
            }
        }
    }

    #[test]
    fn over_time_round_trips_with_target() {
        let policy = statutory();
        for minutes in [0, 240, 480, 510, 600] {
            let interval = session(at(7, 0), Duration::minutes(minutes));
            assert_eq!(
                over_time(&interval, &policy) + policy.target,
                worked_time(&interval, &policy)
            );
        }
    }

    #[test]
    fn over_time_is_negative_for_short_day() {
        let interval = session(at(8, 0), hm(4, 0));
        assert_eq!(over_time(&interval, &statutory()), -hm(4, 0));
    }

    // ========== Projected End Times ==========

    #[test]
    fn statutory_end_times() {
        let policy = statutory();
        assert_eq!(
            normal_end_time(at(8, 0), Duration::zero(), false, &policy),
            at(16, 30)
        );
        assert_eq!(
            max_end_time(at(8, 0), Duration::zero(), false, &policy),
            at(18, 45)
        );
    }

    #[test]
    fn statutory_normal_end_uses_second_break_for_long_target() {
        let policy = BreakPolicy {
            target: Duration::hours(9),
            ..statutory()
        };
        assert_eq!(
            normal_end_time(at(7, 0), Duration::zero(), false, &policy),
            at(16, 45)
        );
    }

    #[test]
    fn end_times_subtract_carried_time() {
        let policy = statutory();
        assert_eq!(
            normal_end_time(at(13, 0), hm(3, 0), false, &policy),
            at(18, 30)
        );
    }

    #[test]
    fn remote_end_times_owe_no_break() {
        let policy = statutory();
        assert_eq!(
            normal_end_time(at(8, 0), Duration::zero(), true, &policy),
            at(16, 0)
        );
        assert_eq!(
            max_end_time(at(8, 0), Duration::zero(), true, &policy),
            at(18, 0)
        );
    }

    #[test]
    fn after_hours_end_times() {
        let policy = after_hours(Duration::hours(6), Duration::minutes(30));
        assert_eq!(
            normal_end_time(at(8, 0), Duration::zero(), false, &policy),
            at(16, 30)
        );

        let short_day = BreakPolicy {
            target: Duration::hours(5),
            ..policy
        };
        assert_eq!(
            normal_end_time(at(8, 0), Duration::zero(), false, &short_day),
            at(13, 0)
        );
    }

    #[test]
    fn fixed_clock_end_times_depend_on_start() {
        let policy = fixed_clock(12.0, Duration::minutes(30));
        // Before the window: full break
        assert_eq!(
            normal_end_time(at(8, 0), Duration::zero(), false, &policy),
            at(16, 30)
        );
        // Inside the window: the rest of it
        assert_eq!(
            normal_end_time(at(12, 10), Duration::zero(), false, &policy),
            at(20, 30)
        );
        // After the window: nothing
        assert_eq!(
            normal_end_time(at(13, 0), Duration::zero(), false, &policy),
            at(21, 0)
        );
    }

    #[test]
    fn projected_normal_end_delivers_target() {
        let policies = [
            statutory(),
            after_hours(Duration::hours(6), Duration::minutes(30)),
            fixed_clock(12.0, Duration::minutes(30)),
        ];
        for policy in &policies {
            let start = at(8, 0);
            let end = normal_end_time(start, Duration::zero(), false, policy);
            let interval = WorkInterval::new(start, end, false);
            assert_eq!(worked_time(&interval, policy), policy.target, "{:?}", policy.mode);
        }
    }
}
