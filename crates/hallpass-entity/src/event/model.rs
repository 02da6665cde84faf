//! Event-history record model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::types::{EventId, PassId, StudentId, UserId};

/// Kind of recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    /// A pass was created.
    PassCreated,
    /// A leg was appended to a pass.
    LegAdded,
    /// A pass was closed.
    PassClosed,
    /// A pass was claimed by staff.
    PassClaimed,
    /// The audit monitor raised an alert.
    SuspiciousActivity,
}

impl AuditEventType {
    /// Return the type as a screaming-snake-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassCreated => "PASS_CREATED",
            Self::LegAdded => "LEG_ADDED",
            Self::PassClosed => "PASS_CLOSED",
            Self::PassClaimed => "PASS_CLAIMED",
            Self::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a student's event history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// The student the event concerns.
    pub student_id: StudentId,
    /// What happened.
    pub event_type: AuditEventType,
    /// The pass involved, if any.
    pub pass_id: Option<PassId>,
    /// The staff member who acted, if any.
    pub actor_id: Option<UserId>,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Free-form supporting data.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl AuditEvent {
    /// Create an event with empty details.
    pub fn new(student_id: StudentId, event_type: AuditEventType, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            student_id,
            event_type,
            pass_id: None,
            actor_id: None,
            timestamp,
            details: serde_json::Value::Null,
        }
    }

    /// Attach the pass.
    pub fn with_pass(mut self, pass_id: PassId) -> Self {
        self.pass_id = Some(pass_id);
        self
    }

    /// Attach the acting staff member.
    pub fn with_actor(mut self, actor_id: UserId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Attach details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
