//! Work interval value type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single work session.
///
/// `end` is `None` while the session is still running. Callers resolve an
/// open end with [`WorkInterval::closed_at`] before handing it to the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Worked remotely (home office).
    #[serde(default)]
    pub is_remote: bool,
}

impl WorkInterval {
    /// A closed interval.
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>, is_remote: bool) -> Self {
        Self {
            start,
            end: Some(end),
            is_remote,
        }
    }

    /// An interval that has started but not ended.
    pub const fn open(start: DateTime<Utc>, is_remote: bool) -> Self {
        Self {
            start,
            end: None,
            is_remote,
        }
    }

    /// Returns the interval with an open end replaced by `now`.
    #[must_use]
    pub fn closed_at(self, now: DateTime<Utc>) -> Self {
        Self {
            end: Some(self.end.unwrap_or(now)),
            ..self
        }
    }

    /// Wall-clock length, clamped to zero. An open interval has no length.
    pub fn raw_duration(&self) -> Duration {
        self.end
            .map_or_else(Duration::zero, |end| (end - self.start).max(Duration::zero()))
    }
}
