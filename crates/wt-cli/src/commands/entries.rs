//! Recorded sessions: add, edit, delete and list.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use wt_core::{BreakPolicy, WorkInterval, aggregate, calendar_month_range, worked_time};
use wt_db::Database;

use crate::commands::util::{format_clock, format_date, format_duration, place};

/// Changes to apply to a recorded session.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryEdit {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub is_remote: Option<bool>,
}

/// Records a finished session.
pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    policy: &BreakPolicy,
    interval: &WorkInterval,
) -> Result<()> {
    ensure_ordered(interval)?;
    let id = db
        .insert_interval(interval)
        .context("failed to record entry")?;
    writeln!(writer, "Added entry {}", describe(id, interval, policy))?;
    Ok(())
}

/// Applies `changes` to the session with the given ID.
pub fn edit<W: Write>(
    writer: &mut W,
    db: &Database,
    policy: &BreakPolicy,
    id: i64,
    changes: EntryEdit,
) -> Result<()> {
    let record = db
        .get_interval(id)?
        .with_context(|| format!("no entry with ID {id}"))?;

    let current = record.interval;
    let interval = WorkInterval {
        start: changes.start.unwrap_or(current.start),
        end: changes.end.or(current.end),
        is_remote: changes.is_remote.unwrap_or(current.is_remote),
    };
    ensure_ordered(&interval)?;

    if !db.update_interval(id, &interval)? {
        anyhow::bail!("no entry with ID {id}");
    }
    writeln!(writer, "Updated entry {}", describe(id, &interval, policy))?;
    Ok(())
}

/// Deletes the session with the given ID.
pub fn delete<W: Write>(writer: &mut W, db: &Database, id: i64) -> Result<()> {
    if !db.delete_interval(id)? {
        anyhow::bail!("no entry with ID {id}");
    }
    writeln!(writer, "Deleted entry {id}")?;
    Ok(())
}

/// Lists recorded sessions with their totals.
///
/// With an `anchor` only the sessions of the month containing it are listed,
/// otherwise all of them.
pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    policy: &BreakPolicy,
    anchor: Option<NaiveDate>,
) -> Result<()> {
    let offset = policy.utc_offset;
    let (heading, from, to, records) = if let Some(anchor) = anchor {
        let (month_start, month_end) = calendar_month_range(anchor);
        let (from, to) = (offset.to_instant(month_start), offset.to_instant(month_end));
        let records = db
            .list_intervals_in_range(from, to)
            .context("failed to load entries")?;
        (anchor.format("%B %Y").to_string(), from, to, records)
    } else {
        let mut records = db.list_intervals().context("failed to load entries")?;
        records.reverse();
        (
            "All entries".to_string(),
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
            records,
        )
    };

    writeln!(writer, "{heading}")?;
    if records.is_empty() {
        writeln!(writer, "No entries.")?;
        return Ok(());
    }

    for record in &records {
        let interval = &record.interval;
        let end = interval
            .end
            .map_or_else(|| "open".to_string(), |end| format_clock(end, offset));
        writeln!(
            writer,
            "{:>4}  {}  {}-{:<5}  {:>6}  {}",
            record.id,
            format_date(interval.start, offset),
            format_clock(interval.start, offset),
            end,
            format_duration(worked_time(interval, policy)),
            place(interval.is_remote)
        )?;
    }

    let intervals: Vec<_> = records.iter().map(|record| record.interval).collect();
    let totals = aggregate(&intervals, from, to, policy);
    writeln!(
        writer,
        "{} entries, worked {}, overtime {}",
        records.len(),
        format_duration(totals.worked_time),
        format_duration(totals.over_time)
    )?;
    Ok(())
}

fn ensure_ordered(interval: &WorkInterval) -> Result<()> {
    if let Some(end) = interval.end {
        if end <= interval.start {
            anyhow::bail!("end {end} is not after start {}", interval.start);
        }
    }
    Ok(())
}

fn describe(id: i64, interval: &WorkInterval, policy: &BreakPolicy) -> String {
    let offset = policy.utc_offset;
    let end = interval
        .end
        .map_or_else(|| "open".to_string(), |end| format_clock(end, offset));
    format!(
        "{id}: {} {}-{} ({}), worked {}",
        format_date(interval.start, offset),
        format_clock(interval.start, offset),
        end,
        place(interval.is_remote),
        format_duration(worked_time(interval, policy))
    )
}
