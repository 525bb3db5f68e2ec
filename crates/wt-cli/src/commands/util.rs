//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Local, NaiveTime, Utc};
use regex::Regex;
use wt_core::{UtcOffset, WorkInterval};
use wt_db::Database;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Pre-compiled regex for a wall-clock time today.
static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// The local UTC offset in effect at `now`.
pub fn local_offset(now: DateTime<Utc>) -> UtcOffset {
    UtcOffset::from_minutes(now.with_timezone(&Local).offset().local_minus_utc() / 60)
}

/// Parse a datetime string relative to `now`.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Clock time today (local): "08:30"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime_at(
    s: &str,
    now: DateTime<Utc>,
    offset: UtcOffset,
) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();

    // Try ISO 8601 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(caps) = CLOCK_TIME_RE.captures(s) {
        let hour: u32 = caps[1].parse().context("failed to parse hour")?;
        let minute: u32 = caps[2].parse().context("failed to parse minute")?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .with_context(|| format!("Invalid clock time: {s}"))?;
        let local = offset.local_date(now).and_time(time);
        return Ok(offset.to_instant(local));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z), a clock time (e.g., 08:30) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Formats a signed duration as `H:MM`, e.g. `7:45` or `-0:30`.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    format!("{sign}{}:{:02}", minutes / 60, minutes % 60)
}

/// Local wall-clock time, `HH:MM`.
pub fn format_clock(instant: DateTime<Utc>, offset: UtcOffset) -> String {
    instant.with_timezone(&offset.fixed()).format("%H:%M").to_string()
}

/// Local date, `YYYY-MM-DD`.
pub fn format_date(instant: DateTime<Utc>, offset: UtcOffset) -> String {
    offset.local_date(instant).format("%Y-%m-%d").to_string()
}

/// Stored intervals starting within `[from, to]`, oldest first.
pub fn intervals_between(
    db: &Database,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> anyhow::Result<Vec<WorkInterval>> {
    let records = db
        .list_intervals_in_range(from, to)
        .context("failed to load intervals")?;
    Ok(records.into_iter().map(|record| record.interval).collect())
}

pub const fn place(is_remote: bool) -> &'static str {
    if is_remote { "remote" } else { "office" }
}
