//! Backup commands: export the store to a file and import it back.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use wt_db::Database;

/// Writes a copy of the store to `path`, which must not exist yet.
pub fn export<W: Write>(writer: &mut W, db: &Database, path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let count = db
        .export_to(path)
        .with_context(|| format!("failed to export to {}", path.display()))?;
    writeln!(writer, "Exported {count} entries to {}", path.display())?;
    Ok(())
}

/// Replaces all recorded sessions with those of the backup at `path`.
pub fn import<W: Write>(writer: &mut W, db: &mut Database, path: &Path) -> Result<()> {
    let count = db
        .import_from(path)
        .with_context(|| format!("failed to import {}", path.display()))?;
    writeln!(writer, "Imported {count} entries from {}", path.display())?;
    Ok(())
}
