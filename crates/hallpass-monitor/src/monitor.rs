//! The audit monitor.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use hallpass_core::config::MonitorConfig;
use hallpass_core::error::AppError;
use hallpass_core::events::{DomainEvent, EventBus, SecurityEvent};
use hallpass_core::types::{AlertId, StudentId, UserId};
use hallpass_database::repositories::EventLogRepository;
use hallpass_entity::alert::{AlertSeverity, AlertType, SuspiciousActivityAlert};
use hallpass_entity::event::{AuditEvent, AuditEventType};
use hallpass_entity::pass::Pass;

use crate::checks::{self, Finding};
use crate::metrics::MonitorMetrics;
use crate::registry::AlertRegistry;

/// Detects suspicious pass activity and keeps the live alert registry.
///
/// Every check is its own error boundary: a failure never propagates to
/// the caller and is recorded as a LOW `MONITORING_FAILED` alert instead.
#[derive(Debug)]
pub struct AuditMonitor {
    config: MonitorConfig,
    registry: Arc<AlertRegistry>,
    history: Arc<dyn EventLogRepository>,
    events: EventBus,
}

impl AuditMonitor {
    /// Create a monitor reading from and appending to `history`.
    pub fn new(
        config: MonitorConfig,
        registry: Arc<AlertRegistry>,
        history: Arc<dyn EventLogRepository>,
        events: EventBus,
    ) -> Self {
        Self {
            config,
            registry,
            history,
            events,
        }
    }

    /// The alert registry.
    pub fn registry(&self) -> &Arc<AlertRegistry> {
        &self.registry
    }

    /// Run the volume, rapid-creation and pattern checks for a student.
    pub async fn check_pass_creation_activity(
        &self,
        student_id: StudentId,
    ) -> Vec<SuspiciousActivityAlert> {
        self.check_pass_creation_activity_at(student_id, Utc::now())
            .await
    }

    /// [`AuditMonitor::check_pass_creation_activity`] at an explicit time.
    pub async fn check_pass_creation_activity_at(
        &self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Vec<SuspiciousActivityAlert> {
        let since = now - Duration::hours(self.config.history_window_hours);
        let history = match self.history.events_since(student_id, since).await {
            Ok(events) => events,
            Err(e) => {
                return self
                    .monitoring_failed(student_id, "pass_creation_activity", &e, now)
                    .await
                    .into_iter()
                    .collect();
            }
        };

        let mut findings = Vec::new();
        findings.extend(checks::excessive_volume(&history, now, &self.config));
        findings.extend(checks::rapid_creation(&history, &self.config));
        findings.extend(checks::unusual_patterns(&history, &self.config));

        debug!(
            student_id = %student_id,
            events = history.len(),
            findings = findings.len(),
            "Creation activity checked"
        );

        let mut raised = Vec::new();
        for finding in findings {
            if let Some(alert) = self.raise(student_id, finding, now).await {
                raised.push(alert);
            }
        }
        raised
    }

    /// Check how long a pass has been open.
    pub async fn check_pass_duration(&self, pass: &Pass) -> Option<SuspiciousActivityAlert> {
        self.check_pass_duration_at(pass, Utc::now()).await
    }

    /// [`AuditMonitor::check_pass_duration`] at an explicit time.
    pub async fn check_pass_duration_at(
        &self,
        pass: &Pass,
        now: DateTime<Utc>,
    ) -> Option<SuspiciousActivityAlert> {
        let finding = checks::long_duration(pass, now, &self.config)?;
        self.raise(pass.student_id, finding, now).await
    }

    /// Run the creation checks on a detached task.
    pub fn spawn_creation_check(self: &Arc<Self>, student_id: StudentId) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            monitor.check_pass_creation_activity(student_id).await;
        })
    }

    /// Run the duration check on a detached task.
    pub fn spawn_duration_check(self: &Arc<Self>, pass: Pass) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            monitor.check_pass_duration(&pass).await;
        })
    }

    /// Unacknowledged alerts, newest first.
    pub fn get_active_alerts(&self) -> Vec<SuspiciousActivityAlert> {
        self.registry.active()
    }

    /// Acknowledge an alert. `false` if it is missing or already acknowledged.
    pub fn acknowledge_alert(&self, alert_id: AlertId, by: UserId) -> bool {
        let acknowledged = self.registry.acknowledge(alert_id, by, Utc::now());
        if acknowledged {
            debug!(alert_id = %alert_id, by = %by, "Alert acknowledged");
        }
        acknowledged
    }

    /// Counts and breakdowns over the registry.
    pub fn generate_metrics(&self) -> MonitorMetrics {
        self.registry.summary()
    }

    /// Remove alerts past the retention period.
    pub fn sweep_alerts(&self, now: DateTime<Utc>) -> usize {
        self.registry
            .sweep(now, Duration::days(self.config.alert_retention_days))
    }

    async fn raise(
        &self,
        student_id: StudentId,
        finding: Finding,
        now: DateTime<Utc>,
    ) -> Option<SuspiciousActivityAlert> {
        let alert = SuspiciousActivityAlert::new(
            finding.alert_type,
            finding.severity,
            student_id,
            finding.description,
            finding.details,
            now,
        );
        let alert = self.registry.insert(alert)?;

        warn!(
            alert_id = %alert.id,
            student_id = %student_id,
            alert_type = %alert.alert_type,
            severity = %alert.severity,
            description = %alert.description,
            "Suspicious activity detected"
        );

        let record = AuditEvent::new(student_id, AuditEventType::SuspiciousActivity, now)
            .with_details(json!({
                "alert_id": alert.id,
                "type": alert.alert_type,
                "severity": alert.severity,
                "description": alert.description,
            }));
        if let Err(e) = self.history.append(record).await {
            error!(
                alert_id = %alert.id,
                error = %e,
                "Failed to record suspicious activity in history"
            );
        }

        self.events.publish(DomainEvent::security(
            None,
            SecurityEvent::AlertRaised {
                alert_id: alert.id.into_uuid(),
                student_id: student_id.into_uuid(),
                alert_type: alert.alert_type.to_string(),
                severity: alert.severity.to_string(),
            },
        ));

        Some(alert)
    }

    async fn monitoring_failed(
        &self,
        student_id: StudentId,
        check: &str,
        err: &AppError,
        now: DateTime<Utc>,
    ) -> Option<SuspiciousActivityAlert> {
        error!(student_id = %student_id, check, error = %err, "Monitoring check failed");
        self.raise(
            student_id,
            Finding {
                alert_type: AlertType::MonitoringFailed,
                severity: AlertSeverity::Low,
                description: format!("Monitoring check {check} failed: {}", err.message),
                details: json!({ "check": check, "error": err.to_string() }),
            },
            now,
        )
        .await
    }
}
