//! Current session state.
//!
//! The running (or most recent) session is kept in `session.json` next to
//! the database. Finished sessions are moved into the database by `wt stop`.

use std::path::Path;

use anyhow::{Context, Result};
use wt_core::WorkSession;

/// Loads the session state from `path`.
///
/// Returns an empty session if the file doesn't exist.
/// Returns an error if the file exists but is unreadable/unparseable.
pub fn load(path: &Path) -> Result<WorkSession> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(WorkSession::default()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Writes the session state to `path`, creating parent directories.
pub fn save(path: &Path, session: &WorkSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let json = serde_json::to_string_pretty(session).context("failed to serialize session")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), started = session.started, "saved session");
    Ok(())
}
