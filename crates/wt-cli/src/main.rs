use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::entries::{self, EntryEdit};
use wt_cli::commands::util::{local_offset, parse_datetime_at};
use wt_cli::commands::{backup, start, stats, status, stop};
use wt_cli::{Cli, Commands, Config, session_store};
use wt_core::WorkInterval;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(wt_db::Database, Config)> {
    let config = load_config(config_path)?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let now = Utc::now();
    let offset = local_offset(now);
    let parse_time = |s: &str| parse_datetime_at(s, now, offset);
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Start { remote, office, at }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let policy = config.break_policy(offset)?;
            let at = at.as_deref().map(parse_time).transpose()?.unwrap_or(now);
            let remote = if *remote {
                Some(true)
            } else if *office {
                Some(false)
            } else {
                config.policy.remote_default
            };
            start::run(&mut stdout, &db, &config.session_path, &policy, at, remote)?;
        }
        Some(Commands::Stop { at }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let policy = config.break_policy(offset)?;
            let at = at.as_deref().map(parse_time).transpose()?.unwrap_or(now);
            stop::run(&mut stdout, &db, &config.session_path, &policy, at)?;
        }
        Some(Commands::Status { json }) => {
            // Status only needs the session file
            let config = load_config(cli.config.as_deref())?;
            let policy = config.break_policy(offset)?;
            let session = session_store::load(&config.session_path)?;
            status::run(
                &mut stdout,
                &session,
                &policy,
                config.policy.max_warn_before(),
                now,
                *json,
            )?;
        }
        Some(Commands::Add { start, end, remote }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let policy = config.break_policy(offset)?;
            let interval = WorkInterval::new(parse_time(start)?, parse_time(end)?, *remote);
            entries::add(&mut stdout, &db, &policy, &interval)?;
        }
        Some(Commands::Edit {
            id,
            start,
            end,
            remote,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let policy = config.break_policy(offset)?;
            let changes = EntryEdit {
                start: start.as_deref().map(parse_time).transpose()?,
                end: end.as_deref().map(parse_time).transpose()?,
                is_remote: *remote,
            };
            entries::edit(&mut stdout, &db, &policy, *id, changes)?;
        }
        Some(Commands::Delete { id }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            entries::delete(&mut stdout, &db, *id)?;
        }
        Some(Commands::List { month, year }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let policy = config.break_policy(offset)?;
            // Without a month or year every entry is listed
            let anchor = if month.is_some() || year.is_some() {
                let today = offset.local_date(now);
                let anchor = NaiveDate::from_ymd_opt(
                    year.unwrap_or_else(|| today.year()),
                    month.unwrap_or_else(|| today.month()),
                    1,
                )
                .context("invalid month")?;
                Some(anchor)
            } else {
                None
            };
            entries::list(&mut stdout, &db, &policy, anchor)?;
        }
        Some(Commands::Stats { date, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let policy = config.break_policy(offset)?;
            let anchor = date.unwrap_or_else(|| offset.local_date(now));
            stats::run(&mut stdout, &db, &policy, anchor, *json)?;
        }
        Some(Commands::Export { path }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            backup::export(&mut stdout, &db, path)?;
        }
        Some(Commands::Import { path }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            backup::import(&mut stdout, &mut db, path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
