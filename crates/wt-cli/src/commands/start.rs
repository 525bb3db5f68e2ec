//! Start command: begins a work session.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use wt_core::{BreakPolicy, calendar_day_range, day_worked_time};
use wt_db::Database;

use crate::commands::util::{format_clock, format_duration, intervals_between, place};
use crate::session_store;

/// Starts a session at `now`.
///
/// `remote` of `None` keeps the flag of the previous session. Time already
/// recorded today is carried into the new session's projected end times.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    session_path: &Path,
    policy: &BreakPolicy,
    now: DateTime<Utc>,
    remote: Option<bool>,
) -> Result<()> {
    let mut session = session_store::load(session_path)?;
    let is_remote = remote.unwrap_or(session.is_remote);
    let carried = worked_today(db, policy, now)?;

    session.start_at(now, carried, is_remote)?;
    session_store::save(session_path, &session)?;
    tracing::debug!(%now, carried_min = carried.num_minutes(), is_remote, "started session");

    let offset = policy.utc_offset;
    writeln!(
        writer,
        "Started work at {} ({})",
        format_clock(now, offset),
        place(is_remote)
    )?;
    if !carried.is_zero() {
        writeln!(writer, "Already worked today: {}", format_duration(carried))?;
    }
    if let Some(normal_end) = session.normal_end_time(policy) {
        writeln!(writer, "Normal end: {}", format_clock(normal_end, offset))?;
    }
    if let Some(max_end) = session.max_end_time(policy) {
        writeln!(writer, "Max end:    {}", format_clock(max_end, offset))?;
    }

    Ok(())
}

/// Worked time of the finished entries on the local day of `now`.
fn worked_today(db: &Database, policy: &BreakPolicy, now: DateTime<Utc>) -> Result<Duration> {
    let offset = policy.utc_offset;
    let (day_start, day_end) = calendar_day_range(offset.local_date(now));
    let intervals: Vec<_> = intervals_between(
        db,
        offset.to_instant(day_start),
        offset.to_instant(day_end) - Duration::milliseconds(1),
    )?
    .into_iter()
    .filter(|interval| interval.end.is_some())
    .collect();
    Ok(day_worked_time(&intervals, policy))
}
