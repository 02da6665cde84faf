//! Alert metrics.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use hallpass_entity::alert::{AlertSeverity, AlertType, SuspiciousActivityAlert};

/// Snapshot of the alert registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorMetrics {
    /// Alerts stored.
    pub total_alerts: usize,
    /// Alerts not yet acknowledged.
    pub active_alerts: usize,
    /// Alerts acknowledged by staff.
    pub acknowledged_alerts: usize,
    /// Alert count per severity, every severity present.
    pub by_severity: BTreeMap<AlertSeverity, usize>,
    /// Alert count per type.
    pub by_type: HashMap<AlertType, usize>,
    /// Distinct students with at least one alert.
    pub flagged_students: usize,
    /// Timestamp of the oldest unacknowledged alert.
    pub oldest_unacknowledged: Option<DateTime<Utc>>,
    /// When the snapshot was taken.
    pub generated_at: DateTime<Utc>,
}

impl MonitorMetrics {
    /// Aggregate a set of alerts.
    pub fn from_alerts(alerts: impl IntoIterator<Item = SuspiciousActivityAlert>) -> Self {
        let mut by_severity: BTreeMap<AlertSeverity, usize> =
            AlertSeverity::ALL.iter().map(|s| (*s, 0)).collect();
        let mut by_type = HashMap::new();
        let mut students = HashSet::new();
        let mut total = 0;
        let mut active = 0;
        let mut oldest: Option<DateTime<Utc>> = None;

        for alert in alerts {
            total += 1;
            *by_severity.entry(alert.severity).or_default() += 1;
            *by_type.entry(alert.alert_type).or_default() += 1;
            students.insert(alert.student_id);
            if !alert.acknowledged {
                active += 1;
                oldest = Some(oldest.map_or(alert.timestamp, |o| o.min(alert.timestamp)));
            }
        }

        Self {
            total_alerts: total,
            active_alerts: active,
            acknowledged_alerts: total - active,
            by_severity,
            by_type,
            flagged_students: students.len(),
            oldest_unacknowledged: oldest,
            generated_at: Utc::now(),
        }
    }
}
