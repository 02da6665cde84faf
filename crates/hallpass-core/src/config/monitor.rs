//! Audit monitor configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Thresholds and windows for the audit monitor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonitorConfig {
    /// Pass creations in one hour that raise a HIGH excessive-passes alert.
    #[serde(default = "default_max_passes_per_hour")]
    #[validate(range(min = 1))]
    pub max_passes_per_hour: usize,
    /// Pass creations in one day that raise a MEDIUM excessive-passes alert.
    #[serde(default = "default_max_passes_per_day")]
    #[validate(range(min = 1))]
    pub max_passes_per_day: usize,
    /// Two creations closer than this are considered rapid.
    #[serde(default = "default_rapid_creation_seconds")]
    #[validate(range(min = 1))]
    pub rapid_creation_seconds: i64,
    /// Number of creations in one rapid burst that indicates automation.
    #[serde(default = "default_rapid_creation_burst")]
    #[validate(range(min = 2))]
    pub rapid_creation_burst: usize,
    /// First local hour (inclusive) of normal school activity.
    #[serde(default = "default_school_start_hour")]
    #[validate(range(max = 23))]
    pub school_start_hour: u32,
    /// Local hour (exclusive) at which normal school activity ends.
    #[serde(default = "default_school_end_hour")]
    #[validate(range(min = 1, max = 24))]
    pub school_end_hour: u32,
    /// Offset of the school's local time from UTC, in minutes.
    #[serde(default)]
    #[validate(range(min = -840, max = 840))]
    pub utc_offset_minutes: i32,
    /// Open pass duration that raises a MEDIUM alert.
    #[serde(default = "default_duration_warning_minutes")]
    #[validate(range(min = 1))]
    pub duration_warning_minutes: i64,
    /// Open pass duration that raises a HIGH alert.
    #[serde(default = "default_duration_critical_minutes")]
    #[validate(range(min = 1))]
    pub duration_critical_minutes: i64,
    /// Alerts older than this are removed by the retention sweep.
    #[serde(default = "default_alert_retention_days")]
    #[validate(range(min = 1))]
    pub alert_retention_days: i64,
    /// Suppress a repeat alert of the same type for the same student
    /// raised within this many seconds.
    #[serde(default = "default_dedup_window_seconds")]
    pub dedup_window_seconds: i64,
    /// How much event history each creation check inspects.
    #[serde(default = "default_history_window_hours")]
    #[validate(range(min = 1, max = 168))]
    pub history_window_hours: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_passes_per_hour: default_max_passes_per_hour(),
            max_passes_per_day: default_max_passes_per_day(),
            rapid_creation_seconds: default_rapid_creation_seconds(),
            rapid_creation_burst: default_rapid_creation_burst(),
            school_start_hour: default_school_start_hour(),
            school_end_hour: default_school_end_hour(),
            utc_offset_minutes: 0,
            duration_warning_minutes: default_duration_warning_minutes(),
            duration_critical_minutes: default_duration_critical_minutes(),
            alert_retention_days: default_alert_retention_days(),
            dedup_window_seconds: default_dedup_window_seconds(),
            history_window_hours: default_history_window_hours(),
        }
    }
}

impl MonitorConfig {
    /// The school's local time zone as a fixed offset.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// School hours must form a non-empty range and duration thresholds
    /// must be ordered.
    pub fn check_school_hours(&self) -> Result<(), AppError> {
        if self.school_start_hour >= self.school_end_hour {
            return Err(AppError::configuration(
                "monitor.school_start_hour must be before monitor.school_end_hour",
            ));
        }
        if self.duration_warning_minutes > self.duration_critical_minutes {
            return Err(AppError::configuration(
                "monitor.duration_warning_minutes must not exceed duration_critical_minutes",
            ));
        }
        Ok(())
    }
}

fn default_max_passes_per_hour() -> usize {
    10
}

fn default_max_passes_per_day() -> usize {
    25
}

fn default_rapid_creation_seconds() -> i64 {
    10
}

fn default_rapid_creation_burst() -> usize {
    3
}

fn default_school_start_hour() -> u32 {
    7
}

fn default_school_end_hour() -> u32 {
    17
}

fn default_duration_warning_minutes() -> i64 {
    30
}

fn default_duration_critical_minutes() -> i64 {
    60
}

fn default_alert_retention_days() -> i64 {
    30
}

fn default_dedup_window_seconds() -> i64 {
    300
}

fn default_history_window_hours() -> i64 {
    24
}
