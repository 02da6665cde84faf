//! In-memory alert registry.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use hallpass_core::types::{AlertId, StudentId, UserId};
use hallpass_entity::alert::{AlertSeverity, AlertType, SuspiciousActivityAlert};

use crate::metrics::MonitorMetrics;

/// Append-only store of raised alerts.
///
/// Alerts are only mutated by acknowledgement and only removed by the
/// retention sweep. A repeat alert of the same type for the same student
/// inside the dedup window is dropped on insert unless it is strictly more
/// severe than the one already raised.
#[derive(Debug)]
pub struct AlertRegistry {
    alerts: DashMap<AlertId, SuspiciousActivityAlert>,
    last_raised: DashMap<(StudentId, AlertType), (DateTime<Utc>, AlertSeverity)>,
    dedup_window: Duration,
}

impl AlertRegistry {
    /// Create an empty registry with the given dedup window.
    pub fn new(dedup_window: Duration) -> Self {
        Self {
            alerts: DashMap::new(),
            last_raised: DashMap::new(),
            dedup_window,
        }
    }

    /// Store a new alert unless an equivalent one was raised recently.
    ///
    /// Returns the stored alert, or `None` if it was suppressed.
    pub fn insert(&self, alert: SuspiciousActivityAlert) -> Option<SuspiciousActivityAlert> {
        let key = (alert.student_id, alert.alert_type);
        match self.last_raised.entry(key) {
            Entry::Occupied(mut last) => {
                let (raised_at, severity) = *last.get();
                if alert.timestamp - raised_at < self.dedup_window && alert.severity <= severity {
                    debug!(
                        student_id = %alert.student_id,
                        alert_type = %alert.alert_type,
                        "Duplicate alert suppressed"
                    );
                    return None;
                }
                last.insert((alert.timestamp, alert.severity));
            }
            Entry::Vacant(slot) => {
                slot.insert((alert.timestamp, alert.severity));
            }
        }
        self.alerts.insert(alert.id, alert.clone());
        Some(alert)
    }

    /// Look up an alert.
    pub fn get(&self, id: AlertId) -> Option<SuspiciousActivityAlert> {
        self.alerts.get(&id).map(|e| e.value().clone())
    }

    /// Acknowledge an alert once.
    ///
    /// Returns `false` without mutating anything if the alert is missing
    /// or already acknowledged.
    pub fn acknowledge(&self, id: AlertId, by: UserId, at: DateTime<Utc>) -> bool {
        match self.alerts.get_mut(&id) {
            Some(mut alert) => alert.acknowledge(by, at),
            None => false,
        }
    }

    /// Unacknowledged alerts, newest first.
    pub fn active(&self) -> Vec<SuspiciousActivityAlert> {
        self.collect(|a| !a.acknowledged)
    }

    /// Alerts of one severity, newest first.
    pub fn by_severity(&self, severity: AlertSeverity) -> Vec<SuspiciousActivityAlert> {
        self.collect(|a| a.severity == severity)
    }

    /// Alerts concerning one student, newest first.
    pub fn by_student(&self, student_id: StudentId) -> Vec<SuspiciousActivityAlert> {
        self.collect(|a| a.student_id == student_id)
    }

    /// Every stored alert, newest first.
    pub fn all(&self) -> Vec<SuspiciousActivityAlert> {
        self.collect(|_| true)
    }

    /// Counts and breakdowns over the current contents.
    pub fn summary(&self) -> MonitorMetrics {
        MonitorMetrics::from_alerts(self.alerts.iter().map(|e| e.value().clone()))
    }

    /// Number of stored alerts.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether no alerts are stored.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Remove alerts raised before `now - retention`. Returns how many went.
    pub fn sweep(&self, now: DateTime<Utc>, retention: Duration) -> usize {
        let cutoff = now - retention;
        let before = self.alerts.len();
        self.alerts.retain(|_, a| a.timestamp >= cutoff);
        let removed = before.saturating_sub(self.alerts.len());

        let dedup_cutoff = now - self.dedup_window;
        self.last_raised.retain(|_, (at, _)| *at >= dedup_cutoff);

        if removed > 0 {
            info!(removed, retention_days = retention.num_days(), "Swept old alerts");
        }
        removed
    }

    fn collect(
        &self,
        keep: impl Fn(&SuspiciousActivityAlert) -> bool,
    ) -> Vec<SuspiciousActivityAlert> {
        let mut out: Vec<_> = self
            .alerts
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }
}
