//! Core domain logic for the work-time tracker.
//!
//! This crate contains:
//! - Rules: worked time, overtime and projected end times of one session
//! - Period aggregation: week/month ranges and day-merging totals
//! - Session: the current work session and its live progress
//!
//! Nothing here reads the clock or touches storage; callers pass every
//! input explicitly.

mod interval;
mod period;
mod policy;
mod rules;
mod session;

pub use interval::WorkInterval;
pub use period::{
    PeriodTotals, aggregate, calendar_day_range, calendar_month_range, calendar_week_range,
    day_worked_time, display_week_number,
};
pub use policy::{
    BreakMode, BreakPolicy, PolicyError, STATUTORY_FIRST_BREAK, STATUTORY_FIRST_THRESHOLD,
    STATUTORY_SECOND_BREAK, STATUTORY_SECOND_THRESHOLD, UtcOffset,
};
pub use rules::{max_end_time, normal_end_time, over_time, worked_time};
pub use session::{SessionError, SessionProgress, WorkSession};
