//! Security and monitoring domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events describing abuse or anomalous behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityEvent {
    /// A user hammered a rate-limited operation and their ban was extended.
    RateLimitEscalated {
        /// The user being throttled.
        user_id: Uuid,
        /// The operation name.
        operation: String,
        /// Requests counted in the current window.
        attempts: u32,
        /// When the extended ban ends.
        reset_at: DateTime<Utc>,
    },
    /// The audit monitor raised an alert.
    AlertRaised {
        /// The alert ID.
        alert_id: Uuid,
        /// The student the alert concerns.
        student_id: Uuid,
        /// Alert type, e.g. `"RAPID_CREATION"`.
        alert_type: String,
        /// Alert severity, e.g. `"CRITICAL"`.
        severity: String,
    },
}
