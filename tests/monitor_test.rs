//! Integration tests for suspicious-activity detection.

mod helpers;

use chrono::{Duration, Utc};

use hallpass_core::types::UserId;
use hallpass_entity::alert::{AlertSeverity, AlertType};
use hallpass_entity::event::{AuditEvent, AuditEventType};
use hallpass_database::repositories::EventLogRepository;

#[tokio::test]
async fn test_three_quick_passes_raise_one_critical_alert() {
    let app = helpers::TestApp::new();
    let ctx = app.staff();
    let student = app.student("Ren");
    let start = Utc::now();

    for i in 0..3 {
        let at = ctx.clone().at(start + Duration::seconds(i * 3));
        let pass = app.open_pass(&at, &student, app.library).await;
        app.step(&at, &pass, &student, "close_pass", None).await;
    }

    app.monitor
        .check_pass_creation_activity_at(student.id, start + Duration::seconds(10))
        .await;
    app.monitor
        .check_pass_creation_activity_at(student.id, start + Duration::seconds(12))
        .await;

    let rapid: Vec<_> = app
        .monitor
        .registry()
        .by_student(student.id)
        .into_iter()
        .filter(|a| a.alert_type == AlertType::RapidCreation)
        .collect();
    assert_eq!(rapid.len(), 1);
    assert_eq!(rapid[0].severity, AlertSeverity::Critical);
}

#[tokio::test]
async fn test_fifteen_passes_in_an_hour_is_high() {
    let app = helpers::TestApp::new();
    let student = app.student("Ren");
    let now = Utc::now();
    for i in 0..15 {
        app.history
            .append(AuditEvent::new(
                student.id,
                AuditEventType::PassCreated,
                now - Duration::minutes(59) + Duration::minutes(i * 4),
            ))
            .await
            .unwrap();
    }

    let alerts = app
        .monitor
        .check_pass_creation_activity_at(student.id, now)
        .await;
    let volume = alerts
        .iter()
        .find(|a| a.alert_type == AlertType::ExcessivePasses)
        .expect("volume alert");
    assert_eq!(volume.severity, AlertSeverity::High);
}

#[tokio::test]
async fn test_long_pass_alert_and_acknowledgement() {
    let app = helpers::TestApp::new();
    let ctx = app.staff();
    let student = app.student("Ren");
    let pass = app.open_pass(&ctx, &student, app.library).await;

    let alert = app
        .monitor
        .check_pass_duration_at(&pass, pass.created_at + Duration::minutes(65))
        .await
        .expect("duration alert");
    assert_eq!(alert.alert_type, AlertType::LongDuration);
    assert_eq!(alert.severity, AlertSeverity::High);
    assert!(alert.description.contains("65"));
    assert!(alert.description.contains("60"));

    let staff = UserId::new();
    assert!(app.monitor.acknowledge_alert(alert.id, staff));
    assert!(!app.monitor.acknowledge_alert(alert.id, staff));
    assert!(!app.monitor.acknowledge_alert(hallpass_core::types::AlertId::new(), staff));

    let metrics = app.monitor.generate_metrics();
    assert_eq!(metrics.acknowledged_alerts, 1);
    assert!(
        app.monitor
            .get_active_alerts()
            .iter()
            .all(|a| a.id != alert.id)
    );
}

#[tokio::test]
async fn test_closed_pass_is_not_checked() {
    let app = helpers::TestApp::new();
    let ctx = app.staff();
    let student = app.student("Ren");
    let pass = app.open_pass(&ctx, &student, app.library).await;
    let closed = app.step(&ctx, &pass, &student, "close_pass", None).await;

    assert!(
        app.monitor
            .check_pass_duration_at(&closed, closed.created_at + Duration::hours(3))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_raised_alerts_land_in_history() {
    let app = helpers::TestApp::new();
    let ctx = app.staff();
    let student = app.student("Ren");
    let pass = app.open_pass(&ctx, &student, app.library).await;

    app.monitor
        .check_pass_duration_at(&pass, pass.created_at + Duration::minutes(40))
        .await
        .expect("medium alert");

    let suspicious = app
        .history
        .all_for_student(student.id)
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::SuspiciousActivity)
        .count();
    assert!(suspicious >= 1);
}

#[tokio::test]
async fn test_daily_volume_alert_escalates_to_hourly() {
    let app = helpers::TestApp::new();
    let student = app.student("Ren");
    let now = Utc::now();
    let created = |at| AuditEvent::new(student.id, AuditEventType::PassCreated, at);

    for i in 0..16 {
        app.history
            .append(created(now - Duration::hours(2) - Duration::minutes(i * 20)))
            .await
            .unwrap();
    }
    for i in 0..9 {
        app.history
            .append(created(now - Duration::minutes(50) + Duration::minutes(i * 5)))
            .await
            .unwrap();
    }

    let first: Vec<_> = app
        .monitor
        .check_pass_creation_activity_at(student.id, now)
        .await
        .into_iter()
        .filter(|a| a.alert_type == AlertType::ExcessivePasses)
        .map(|a| a.severity)
        .collect();
    assert_eq!(first, vec![AlertSeverity::Medium]);

    let later = now + Duration::seconds(60);
    app.history.append(created(later)).await.unwrap();
    let second: Vec<_> = app
        .monitor
        .check_pass_creation_activity_at(student.id, later)
        .await
        .into_iter()
        .filter(|a| a.alert_type == AlertType::ExcessivePasses)
        .map(|a| a.severity)
        .collect();
    assert_eq!(second, vec![AlertSeverity::High]);
    assert_eq!(app.monitor.registry().by_severity(AlertSeverity::High).len(), 1);
}
