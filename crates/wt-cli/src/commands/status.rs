//! Status command: the current session and its projected end times.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use wt_core::{BreakPolicy, SessionProgress, WorkSession};

use crate::commands::util::{format_clock, format_duration, place};

/// JSON output for `wt status --json`.
#[derive(Debug, Serialize)]
struct StatusReport {
    started: bool,
    is_remote: bool,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    worked_minutes: i64,
    over_time_minutes: i64,
    normal_end: Option<DateTime<Utc>>,
    max_end: Option<DateTime<Utc>>,
    max_warning: Option<DateTime<Utc>>,
    percent_of_normal: f64,
    percent_of_max: f64,
    in_over_time: bool,
}

impl StatusReport {
    fn new(
        session: &WorkSession,
        progress: Option<&SessionProgress>,
        max_warning: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            started: session.started,
            is_remote: session.is_remote,
            start: session.start,
            end: session.end,
            worked_minutes: progress.map_or(0, |p| p.worked.num_minutes()),
            over_time_minutes: progress.map_or(0, |p| p.over_time.num_minutes()),
            normal_end: progress.map(|p| p.normal_end),
            max_end: progress.map(|p| p.max_end),
            max_warning,
            percent_of_normal: progress.map_or(0.0, |p| percent(p.percent_of_normal)),
            percent_of_max: progress.map_or(0.0, |p| percent(p.percent_of_max)),
            in_over_time: progress.is_some_and(|p| p.in_over_time),
        }
    }
}

/// Writes the status of `session` at `now`.
pub fn run<W: Write>(
    writer: &mut W,
    session: &WorkSession,
    policy: &BreakPolicy,
    warn_before: Duration,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let progress = session.progress_at(now, policy);
    let max_warning = session.max_warning_time(policy, warn_before);

    if json {
        let report = StatusReport::new(session, progress.as_ref(), max_warning);
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    let (Some(start), Some(progress)) = (session.start, progress) else {
        writeln!(writer, "No work session recorded.")?;
        return Ok(());
    };

    let offset = policy.utc_offset;
    let location = place(session.is_remote);
    match session.end.filter(|_| !session.started) {
        Some(end) => writeln!(
            writer,
            "Last session {}-{} ({location})",
            format_clock(start, offset),
            format_clock(end, offset)
        )?,
        None => writeln!(
            writer,
            "Working since {} ({location})",
            format_clock(start, offset)
        )?,
    }

    writeln!(
        writer,
        "Worked:     {} ({:.0}% of normal, {:.0}% of max)",
        format_duration(progress.worked),
        percent(progress.percent_of_normal),
        percent(progress.percent_of_max)
    )?;
    writeln!(writer, "Overtime:   {}", format_duration(progress.over_time))?;
    writeln!(writer, "Normal end: {}", format_clock(progress.normal_end, offset))?;
    writeln!(
        writer,
        "Max end:    {} (warning at {})",
        format_clock(progress.max_end, offset),
        format_clock(progress.max_end - warn_before, offset)
    )?;
    if session.started && progress.in_over_time {
        writeln!(writer, "In overtime since {}", format_clock(progress.normal_end, offset))?;
    }

    Ok(())
}

fn percent(ratio: f64) -> f64 {
    (ratio * 100.0).round()
}
