//! Alert entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::types::{AlertId, StudentId, UserId};

use super::kind::{AlertSeverity, AlertType};

/// A detected anomalous usage pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousActivityAlert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Pattern detected.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Severity.
    pub severity: AlertSeverity,
    /// The student the alert concerns.
    pub student_id: StudentId,
    /// Human-readable summary.
    pub description: String,
    /// Supporting data (offending events, counts, thresholds).
    pub details: serde_json::Value,
    /// When the alert was raised.
    pub timestamp: DateTime<Utc>,
    /// Whether staff have acknowledged it.
    pub acknowledged: bool,
    /// Who acknowledged it.
    pub acknowledged_by: Option<UserId>,
    /// When it was acknowledged.
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl SuspiciousActivityAlert {
    /// Create a fresh, unacknowledged alert.
    pub fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        student_id: StudentId,
        description: impl Into<String>,
        details: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            alert_type,
            severity,
            student_id,
            description: description.into(),
            details,
            timestamp,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
        }
    }

    /// Acknowledge the alert. Returns `false` if it was already acknowledged.
    pub fn acknowledge(&mut self, by: UserId, at: DateTime<Utc>) -> bool {
        if self.acknowledged {
            return false;
        }
        self.acknowledged = true;
        self.acknowledged_by = Some(by);
        self.acknowledged_at = Some(at);
        true
    }
}
