//! In-memory event history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use hallpass_core::result::AppResult;
use hallpass_core::types::StudentId;
use hallpass_entity::event::AuditEvent;

use crate::repositories::EventLogRepository;

/// Per-student event history held in process memory.
#[derive(Debug, Default)]
pub struct MemoryEventLogRepository {
    events: DashMap<StudentId, Vec<AuditEvent>>,
}

impl MemoryEventLogRepository {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded event for the student, oldest first.
    pub fn all_for_student(&self, student_id: StudentId) -> Vec<AuditEvent> {
        let mut events = self
            .events
            .get(&student_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        events.sort_by_key(|e| e.timestamp);
        events
    }
}

#[async_trait]
impl EventLogRepository for MemoryEventLogRepository {
    async fn events_since(
        &self,
        student_id: StudentId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AuditEvent>> {
        let mut events: Vec<AuditEvent> = self
            .events
            .get(&student_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|e| e.timestamp >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    async fn append(&self, event: AuditEvent) -> AppResult<()> {
        self.events.entry(event.student_id).or_default().push(event);
        Ok(())
    }
}
