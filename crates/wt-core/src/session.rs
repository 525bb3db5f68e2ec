//! The current work session.
//!
//! A [`WorkSession`] is the value behind "start work" / "stop work": it is
//! loaded once per process, changed by [`WorkSession::start_at`] or
//! [`WorkSession::stop_at`], and saved again by the caller.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::WorkInterval;
use crate::policy::BreakPolicy;
use crate::rules::{max_end_time, normal_end_time, worked_time};

/// Invalid session transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("work already started at {0}")]
    AlreadyStarted(DateTime<Utc>),

    #[error("work has not been started")]
    NotStarted,
}

/// State of the current (or most recent) work session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSession {
    /// A session is running.
    pub started: bool,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Time already worked earlier the same day when the session started.
    #[serde(with = "duration_ms", rename = "carried_ms", default)]
    pub carried: Duration,
    pub is_remote: bool,
}

/// Live figures for a session at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionProgress {
    /// Worked time today, including the carried time.
    pub worked: Duration,
    /// Worked time today minus the daily target.
    pub over_time: Duration,
    pub normal_end: DateTime<Utc>,
    pub max_end: DateTime<Utc>,
    /// Share of the target reached so far.
    pub percent_of_normal: f64,
    /// Where the target sits on the way to the maximum.
    pub normal_share_of_max: f64,
    /// Share of the maximum reached so far.
    pub percent_of_max: f64,
    /// The normal end has passed.
    pub in_over_time: bool,
}

impl WorkSession {
    /// Starts a new session at `now`.
    pub fn start_at(
        &mut self,
        now: DateTime<Utc>,
        carried: Duration,
        is_remote: bool,
    ) -> Result<(), SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted(self.start.unwrap_or(now)));
        }
        *self = Self {
            started: true,
            start: Some(now),
            end: None,
            carried,
            is_remote,
        };
        Ok(())
    }

    /// Stops the running session and returns the finished interval.
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Result<WorkInterval, SessionError> {
        let Some(start) = self.start.filter(|_| self.started) else {
            return Err(SessionError::NotStarted);
        };
        self.started = false;
        self.end = Some(now);
        Ok(WorkInterval::new(start, now, self.is_remote))
    }

    /// The session as an interval, a running session ending at `now`.
    pub fn interval_at(&self, now: DateTime<Utc>) -> Option<WorkInterval> {
        let start = self.start?;
        let end = if self.started { Some(now) } else { self.end };
        Some(WorkInterval {
            start,
            end,
            is_remote: self.is_remote,
        })
    }

    pub fn normal_end_time(&self, policy: &BreakPolicy) -> Option<DateTime<Utc>> {
        self.start
            .map(|start| normal_end_time(start, self.carried, self.is_remote, policy))
    }

    pub fn max_end_time(&self, policy: &BreakPolicy) -> Option<DateTime<Utc>> {
        self.start
            .map(|start| max_end_time(start, self.carried, self.is_remote, policy))
    }

    /// When a reminder `warn_before` the maximum end should fire.
    pub fn max_warning_time(
        &self,
        policy: &BreakPolicy,
        warn_before: Duration,
    ) -> Option<DateTime<Utc>> {
        self.max_end_time(policy).map(|max_end| max_end - warn_before)
    }

    /// Worked time, overtime and progress ratios at `now`.
    ///
    /// A finished session is evaluated at its end.
    pub fn progress_at(&self, now: DateTime<Utc>, policy: &BreakPolicy) -> Option<SessionProgress> {
        let interval = self.interval_at(now)?;
        let start = interval.start;
        let current = interval.end.unwrap_or(now);
        let normal_end = normal_end_time(start, self.carried, self.is_remote, policy);
        let max_end = max_end_time(start, self.carried, self.is_remote, policy);

        let worked = worked_time(&interval, policy) + self.carried;
        let elapsed = current - start + self.carried;
        let to_normal = normal_end - start + self.carried;
        let to_max = max_end - start + self.carried;

        Some(SessionProgress {
            worked,
            over_time: worked - policy.target,
            normal_end,
            max_end,
            percent_of_normal: ratio(elapsed, to_normal),
            normal_share_of_max: ratio(to_normal, to_max),
            percent_of_max: ratio(elapsed, to_max),
            in_over_time: current > normal_end,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: Duration, whole: Duration) -> f64 {
    let whole_ms = whole.num_milliseconds();
    if whole_ms == 0 {
        return 0.0;
    }
    part.num_milliseconds() as f64 / whole_ms as f64
}

/// Serializes a `Duration` as whole milliseconds.
mod duration_ms {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::milliseconds)
    }
}
