//! Alert type and severity enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How urgently an alert needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    /// Informational.
    Low,
    /// Worth a look.
    Medium,
    /// Needs follow-up today.
    High,
    /// Needs follow-up now.
    Critical,
}

impl AlertSeverity {
    /// All severities, least severe first.
    pub const ALL: [AlertSeverity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Return the severity as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pattern an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Too many passes in an hour or a day.
    ExcessivePasses,
    /// Passes created faster than a person plausibly would.
    RapidCreation,
    /// Activity outside school hours.
    AfterHoursActivity,
    /// Activity on a Saturday or Sunday.
    WeekendActivity,
    /// A pass has been open too long.
    LongDuration,
    /// A monitoring check itself failed.
    MonitoringFailed,
}

impl AlertType {
    /// Return the type as a screaming-snake-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExcessivePasses => "EXCESSIVE_PASSES",
            Self::RapidCreation => "RAPID_CREATION",
            Self::AfterHoursActivity => "AFTER_HOURS_ACTIVITY",
            Self::WeekendActivity => "WEEKEND_ACTIVITY",
            Self::LongDuration => "LONG_DURATION",
            Self::MonitoringFailed => "MONITORING_FAILED",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
