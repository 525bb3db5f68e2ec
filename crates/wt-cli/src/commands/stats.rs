//! Stats command: week and month totals.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use wt_core::{
    BreakPolicy, PeriodTotals, aggregate, calendar_month_range, calendar_week_range,
    display_week_number,
};
use wt_db::Database;

use crate::commands::util::{format_duration, intervals_between};

/// Weekdays shown in the week table.
const WORK_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

#[derive(Debug, Serialize)]
struct StatsReport {
    week: WeekReport,
    month: MonthReport,
}

#[derive(Debug, Serialize)]
struct WeekReport {
    number: u32,
    /// First day (Sunday).
    start: NaiveDate,
    /// Last day (Saturday).
    end: NaiveDate,
    worked_minutes: i64,
    over_time_minutes: i64,
    days: Vec<DayReport>,
}

#[derive(Debug, Serialize)]
struct DayReport {
    weekday: String,
    over_time_minutes: i64,
}

#[derive(Debug, Serialize)]
struct MonthReport {
    year: i32,
    month: u32,
    worked_minutes: i64,
    over_time_minutes: i64,
}

/// Writes the totals of the week and the month containing `anchor`.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    policy: &BreakPolicy,
    anchor: NaiveDate,
    json: bool,
) -> Result<()> {
    let report = build_report(db, policy, anchor)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    let week = &report.week;
    writeln!(
        writer,
        "Week {} ({} to {})",
        week.number,
        week.start.format("%Y-%m-%d"),
        week.end.format("%Y-%m-%d")
    )?;
    writeln!(writer, "Worked:   {}", minutes(week.worked_minutes))?;
    writeln!(writer, "Overtime: {}", minutes(week.over_time_minutes))?;
    for day in &week.days {
        writeln!(writer, "  {}  {:>6}", day.weekday, minutes(day.over_time_minutes))?;
    }

    let month = &report.month;
    writeln!(writer)?;
    writeln!(writer, "{}", anchor.format("%B %Y"))?;
    writeln!(writer, "Worked:   {}", minutes(month.worked_minutes))?;
    writeln!(writer, "Overtime: {}", minutes(month.over_time_minutes))?;

    Ok(())
}

fn build_report(db: &Database, policy: &BreakPolicy, anchor: NaiveDate) -> Result<StatsReport> {
    let offset = policy.utc_offset;

    // The week range is half-open, the store query inclusive.
    let (week_start, week_end) = calendar_week_range(anchor);
    let week_from = offset.to_instant(week_start);
    let week_to = offset.to_instant(week_end) - Duration::milliseconds(1);
    let week_totals = totals_between(db, policy, week_from, week_to)?;

    let (month_start, month_end) = calendar_month_range(anchor);
    let month_totals = totals_between(
        db,
        policy,
        offset.to_instant(month_start),
        offset.to_instant(month_end),
    )?;
    tracing::debug!(
        %anchor,
        week_min = week_totals.worked_time.num_minutes(),
        month_min = month_totals.worked_time.num_minutes(),
        "computed stats"
    );

    Ok(StatsReport {
        week: WeekReport {
            number: display_week_number(week_start),
            start: week_start.date(),
            end: week_start.date() + Duration::days(6),
            worked_minutes: week_totals.worked_time.num_minutes(),
            over_time_minutes: week_totals.over_time.num_minutes(),
            days: WORK_DAYS
                .iter()
                .map(|&weekday| DayReport {
                    weekday: weekday.to_string(),
                    over_time_minutes: week_totals.over_time_on(weekday).num_minutes(),
                })
                .collect(),
        },
        month: MonthReport {
            year: anchor.year(),
            month: anchor.month(),
            worked_minutes: month_totals.worked_time.num_minutes(),
            over_time_minutes: month_totals.over_time.num_minutes(),
        },
    })
}

fn totals_between(
    db: &Database,
    policy: &BreakPolicy,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<PeriodTotals> {
    let intervals = intervals_between(db, from, to)?;
    Ok(aggregate(&intervals, from, to, policy))
}

fn minutes(value: i64) -> String {
    format_duration(Duration::minutes(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use insta::assert_snapshot;
    use wt_core::WorkInterval;

    fn entry(month: u32, day: u32, from: u32, to: u32) -> WorkInterval {
        WorkInterval::new(
            Utc.with_ymd_and_hms(2025, month, day, from, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, month, day, to, 0, 0).unwrap(),
            false,
        )
    }

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        // Week 5: Mon split into two sessions, Tue long, Thu short
        db.insert_interval(&entry(1, 27, 8, 12)).unwrap();
        db.insert_interval(&entry(1, 27, 13, 17)).unwrap();
        db.insert_interval(&entry(1, 28, 8, 17)).unwrap();
        db.insert_interval(&entry(1, 30, 8, 14)).unwrap();
        // Previous week, same month
        db.insert_interval(&entry(1, 20, 8, 16)).unwrap();
        // Saturday of week 5 is in February
        db.insert_interval(&entry(2, 1, 9, 11)).unwrap();
        db
    }

    fn stats(db: &Database, json: bool) -> String {
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
        let mut output = Vec::new();
        run(&mut output, db, &BreakPolicy::default(), anchor, json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn stats_week_and_month() {
        assert_snapshot!(stats(&seeded_db(), false), @r"
Week 5 (2025-01-26 to 2025-02-01)
Worked:   24:30
Overtime: -7:30
  Mon    0:00
  Tue    0:30
  Wed    0:00
  Thu   -2:00
  Fri    0:00

January 2025
Worked:   30:00
Overtime: -2:00
");
    }

    #[test]
    fn stats_json() {
        let report: serde_json::Value = serde_json::from_str(&stats(&seeded_db(), true)).unwrap();
        assert_eq!(report["week"]["number"], 5);
        assert_eq!(report["week"]["start"], "2025-01-26");
        assert_eq!(report["week"]["worked_minutes"], 24 * 60 + 30);
        assert_eq!(report["week"]["days"][1]["weekday"], "Tue");
        assert_eq!(report["week"]["days"][1]["over_time_minutes"], 30);
        assert_eq!(report["month"]["month"], 1);
        assert_eq!(report["month"]["worked_minutes"], 30 * 60);
        assert_eq!(report["month"]["over_time_minutes"], -120);
    }

    #[test]
    fn stats_empty() {
        let db = Database::open_in_memory().unwrap();
        let report: serde_json::Value = serde_json::from_str(&stats(&db, true)).unwrap();
        assert_eq!(report["week"]["worked_minutes"], 0);
        assert_eq!(report["month"]["over_time_minutes"], 0);
    }
}
