//! Stop command: ends the running session and records it.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use wt_core::{BreakPolicy, worked_time};
use wt_db::Database;

use crate::commands::util::{format_clock, format_duration, place};
use crate::session_store;

/// Stops the running session at `now` and stores the finished interval.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    session_path: &Path,
    policy: &BreakPolicy,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut session = session_store::load(session_path)?;
    let interval = session.stop_at(now)?;
    if now <= interval.start {
        anyhow::bail!(
            "end time {} is not after the start {}",
            format_clock(now, policy.utc_offset),
            format_clock(interval.start, policy.utc_offset)
        );
    }

    let id = db
        .insert_interval(&interval)
        .context("failed to record session")?;
    session_store::save(session_path, &session)?;
    tracing::debug!(id, %now, "stopped session");

    let offset = policy.utc_offset;
    writeln!(
        writer,
        "Stopped work at {} ({})",
        format_clock(now, offset),
        place(interval.is_remote)
    )?;
    writeln!(
        writer,
        "Entry {id}: {}-{}, worked {}",
        format_clock(interval.start, offset),
        format_clock(now, offset),
        format_duration(worked_time(&interval, policy))
    )?;
    if let Some(progress) = session.progress_at(now, policy) {
        writeln!(
            writer,
            "Today: worked {}, overtime {}",
            format_duration(progress.worked),
            format_duration(progress.over_time)
        )?;
    }

    Ok(())
}
