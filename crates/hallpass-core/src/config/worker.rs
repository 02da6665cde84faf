//! Maintenance scheduler configuration.

use serde::{Deserialize, Serialize};

/// Cron expressions (six fields, seconds first) for periodic maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the maintenance scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sweep of elapsed rate-limit windows.
    #[serde(default = "default_rate_limit_sweep")]
    pub rate_limit_sweep: String,
    /// Removal of alerts older than the retention period.
    #[serde(default = "default_alert_retention_sweep")]
    pub alert_retention_sweep: String,
    /// Duration check over every open pass.
    #[serde(default = "default_open_pass_scan")]
    pub open_pass_scan: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_limit_sweep: default_rate_limit_sweep(),
            alert_retention_sweep: default_alert_retention_sweep(),
            open_pass_scan: default_open_pass_scan(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rate_limit_sweep() -> String {
    "0 * * * * *".to_string()
}

fn default_alert_retention_sweep() -> String {
    "0 0 2 * * *".to_string()
}

fn default_open_pass_scan() -> String {
    "0 */5 * * * *".to_string()
}
