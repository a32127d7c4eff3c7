use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TimetableError};

pub const DEFAULT_API_BASE_URL: &str = "https://beste.schule/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const REFRESH_INTERVAL_SECS: u64 = 60 * 7; // refresh the timetable every 7 minutes
pub const RELOAD_INTERVAL_SECS: u64 = 60 * 60 * 6; // full reset every 6 hours
/// Covers about seven weeks of holidays without searching forever.
pub const MAX_DAYS_OFF: u32 = 50;
pub const SHOW_COUNTDOWN_DAYS: u32 = 5;
pub const SCHOOL_DAY_ENDS_AT_HOUR: u32 = 17;
pub const SUBJECT_LABEL_MAX_CHARS: usize = 15;

/// Top-level config (timetable.toml + TIMETABLE_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Where and how the school journal API is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL without trailing slash, e.g. `https://beste.schule/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Timers and search bounds used by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,
    /// Upper bound of calendar days searched for the next day with lessons.
    #[serde(default = "default_max_days_off")]
    pub max_days_off: u32,
    /// From this local hour on, the current school day counts as over.
    #[serde(default = "default_school_day_ends_at_hour")]
    pub school_day_ends_at_hour: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: REFRESH_INTERVAL_SECS,
            reload_interval_secs: RELOAD_INTERVAL_SECS,
            max_days_off: MAX_DAYS_OFF,
            school_day_ends_at_hour: SCHOOL_DAY_ENDS_AT_HOUR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show a holiday countdown instead of the grid from this many days off on.
    #[serde(default = "default_show_countdown_days")]
    pub show_countdown_days: u32,
    /// Subject names at least this long are replaced by their short code.
    #[serde(default = "default_subject_label_max_chars")]
    pub subject_label_max_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_countdown_days: SHOW_COUNTDOWN_DAYS,
            subject_label_max_chars: SUBJECT_LABEL_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_refresh_interval_secs() -> u64 {
    REFRESH_INTERVAL_SECS
}
fn default_reload_interval_secs() -> u64 {
    RELOAD_INTERVAL_SECS
}
fn default_max_days_off() -> u32 {
    MAX_DAYS_OFF
}
fn default_school_day_ends_at_hour() -> u32 {
    SCHOOL_DAY_ENDS_AT_HOUR
}
fn default_show_countdown_days() -> u32 {
    SHOW_COUNTDOWN_DAYS
}
fn default_subject_label_max_chars() -> usize {
    SUBJECT_LABEL_MAX_CHARS
}
fn default_token_path() -> String {
    data_dir().join("token.json").to_string_lossy().into_owned()
}

/// `~/.timetable`, or `./.timetable` when HOME is unset.
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".timetable")
}

fn default_config_path() -> String {
    data_dir()
        .join("timetable.toml")
        .to_string_lossy()
        .into_owned()
}

impl TimetableConfig {
    /// Load config from a TOML file with TIMETABLE_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `TIMETABLE_SCHEDULE__MAX_DAYS_OFF=30`. A missing file is not an error;
    /// every field has a default.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: TimetableConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("TIMETABLE_").split("__"))
            .extract()
            .map_err(|e| TimetableError::Config(e.to_string()))?;

        config.validate()?;
        debug!(
            path = %path,
            base_url = %config.api.base_url,
            refresh_secs = config.schedule.refresh_interval_secs,
            max_days_off = config.schedule.max_days_off,
            "config loaded"
        );
        Ok(config)
    }

    /// Reject values that would stall the board or break the date logic.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.refresh_interval_secs == 0 {
            return Err(TimetableError::Config(
                "schedule.refresh_interval_secs must be positive".to_string(),
            ));
        }
        if self.schedule.reload_interval_secs == 0 {
            return Err(TimetableError::Config(
                "schedule.reload_interval_secs must be positive".to_string(),
            ));
        }
        if self.schedule.school_day_ends_at_hour > 24 {
            return Err(TimetableError::Config(format!(
                "schedule.school_day_ends_at_hour out of range: {}",
                self.schedule.school_day_ends_at_hour
            )));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(TimetableError::Config("api.base_url is empty".to_string()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.refresh_interval_secs)
    }

    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.reload_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}
