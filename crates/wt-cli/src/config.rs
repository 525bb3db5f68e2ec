//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wt_core::{BreakMode, BreakPolicy, PolicyError, UtcOffset};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Path to the current session state file.
    pub session_path: PathBuf,
    /// Working-time settings.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Working-time settings as they appear in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hours expected per day.
    pub target_hours: f64,
    /// Hours allowed per day.
    pub max_hours: f64,
    /// No breaks are owed when working from home.
    pub skip_breaks_remote: bool,
    /// Use an individual break instead of the statutory one.
    pub break_individual: bool,
    /// Individual break is taken after `break_after_hours` of work.
    /// When false, it is taken at `break_at_hour` on the clock.
    pub break_after_hours_enabled: bool,
    pub break_after_hours: f64,
    pub break_minutes: i64,
    /// Local clock time of the fixed break, 12.5 = 12:30.
    pub break_at_hour: f64,
    /// How long before the maximum end the warning is due.
    pub max_warn_before_minutes: i64,
    /// Remote flag for `wt start` without `--remote`/`--office`.
    /// Unset keeps the flag of the previous session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_default: Option<bool>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            target_hours: 8.0,
            max_hours: 10.0,
            skip_breaks_remote: true,
            break_individual: false,
            break_after_hours_enabled: true,
            break_after_hours: 6.0,
            break_minutes: 30,
            break_at_hour: 12.0,
            max_warn_before_minutes: 15,
            remote_default: None,
        }
    }
}

impl PolicyConfig {
    pub fn max_warn_before(&self) -> Duration {
        Duration::minutes(self.max_warn_before_minutes)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("session_path", &self.session_path)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("wt.db"),
            session_path: data_dir.join("session.json"),
            policy: PolicyConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WT_*, nested keys split on "__")
        figment = figment.merge(Env::prefixed("WT_").split("__"));

        figment.extract()
    }

    /// Builds the rule engine policy for evaluation at `utc_offset`.
    pub fn break_policy(&self, utc_offset: UtcOffset) -> Result<BreakPolicy, PolicyError> {
        let settings = &self.policy;
        let policy = BreakPolicy {
            target: hours(settings.target_hours),
            max: hours(settings.max_hours),
            mode: BreakMode::from_flags(
                settings.break_individual,
                settings.break_after_hours_enabled,
                hours(settings.break_after_hours),
                settings.break_at_hour,
                Duration::minutes(settings.break_minutes),
            ),
            skip_breaks_remote: settings.skip_breaks_remote,
            utc_offset,
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Fractional hours to whole minutes.
#[allow(clippy::cast_possible_truncation)]
fn hours(value: f64) -> Duration {
    Duration::minutes((value * 60.0).round() as i64)
}

/// Returns the platform-specific config directory for wt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wt"))
}

/// Returns the platform-specific data directory for wt.
///
/// On Linux: `~/.local/share/wt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wt"))
}
