//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Work-time tracker.
///
/// Records work sessions, deducts statutory or individual breaks and keeps
/// track of overtime per week and month.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a work session.
    Start {
        /// Work from home (no breaks owed if configured).
        #[arg(long, conflicts_with = "office")]
        remote: bool,

        /// Work at the office.
        #[arg(long)]
        office: bool,

        /// Start time (RFC 3339, HH:MM or e.g. '15 minutes ago'). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Stop the running work session and record it.
    Stop {
        /// End time (RFC 3339, HH:MM or e.g. '15 minutes ago'). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the current session with projected end times.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record a finished work session.
    Add {
        /// Start time.
        #[arg(long)]
        start: String,

        /// End time.
        #[arg(long)]
        end: String,

        /// Worked from home.
        #[arg(long)]
        remote: bool,
    },

    /// Change a recorded work session.
    Edit {
        /// Entry ID (see `wt list`).
        id: i64,

        /// New start time.
        #[arg(long)]
        start: Option<String>,

        /// New end time.
        #[arg(long)]
        end: Option<String>,

        /// Worked from home.
        #[arg(long)]
        remote: Option<bool>,
    },

    /// Delete a recorded work session.
    Delete {
        /// Entry ID (see `wt list`).
        id: i64,
    },

    /// List recorded sessions, all of them or those of one month.
    List {
        /// Month (1-12). Defaults to the current month when only the year is given.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year. Defaults to the current year when only the month is given.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show week and month totals.
    Stats {
        /// Any day of the week/month to report. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a copy of the database to a new file.
    Export {
        /// Destination file. Must not exist.
        path: PathBuf,
    },

    /// Replace all recorded sessions with those of an exported file.
    Import {
        /// Exported database file.
        path: PathBuf,
    },
}
