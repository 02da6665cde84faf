//! Pure anomaly detectors.
//!
//! Each detector looks at already-fetched data and returns findings; the
//! monitor turns findings into alerts. Nothing here does I/O.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use serde_json::json;

use hallpass_core::config::MonitorConfig;
use hallpass_entity::alert::{AlertSeverity, AlertType};
use hallpass_entity::event::{AuditEvent, AuditEventType};
use hallpass_entity::pass::Pass;

/// A detected pattern, not yet stored as an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Pattern type.
    pub alert_type: AlertType,
    /// Severity.
    pub severity: AlertSeverity,
    /// Human-readable summary.
    pub description: String,
    /// Supporting data.
    pub details: serde_json::Value,
}

fn creations(events: &[AuditEvent]) -> Vec<&AuditEvent> {
    let mut created: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == AuditEventType::PassCreated)
        .collect();
    created.sort_by_key(|e| e.timestamp);
    created
}

/// Too many passes in the trailing hour (HIGH) or day (MEDIUM).
///
/// Only the more severe of the two is reported.
pub fn excessive_volume(
    events: &[AuditEvent],
    now: DateTime<Utc>,
    config: &MonitorConfig,
) -> Option<Finding> {
    let created = creations(events);
    let in_last = |window: Duration| {
        created
            .iter()
            .filter(|e| e.timestamp > now - window && e.timestamp <= now)
            .count()
    };
    let hourly = in_last(Duration::hours(1));
    let daily = in_last(Duration::hours(24));

    if hourly >= config.max_passes_per_hour {
        return Some(Finding {
            alert_type: AlertType::ExcessivePasses,
            severity: AlertSeverity::High,
            description: format!(
                "{hourly} passes created in the last hour (threshold {})",
                config.max_passes_per_hour
            ),
            details: json!({
                "window": "1h",
                "count": hourly,
                "threshold": config.max_passes_per_hour,
            }),
        });
    }
    if daily >= config.max_passes_per_day {
        return Some(Finding {
            alert_type: AlertType::ExcessivePasses,
            severity: AlertSeverity::Medium,
            description: format!(
                "{daily} passes created in the last 24 hours (threshold {})",
                config.max_passes_per_day
            ),
            details: json!({
                "window": "24h",
                "count": daily,
                "threshold": config.max_passes_per_day,
            }),
        });
    }
    None
}

/// A burst of creations each closer than `rapid_creation_seconds` to the
/// previous one, reaching `rapid_creation_burst` passes. Reports the first
/// such burst only.
pub fn rapid_creation(events: &[AuditEvent], config: &MonitorConfig) -> Option<Finding> {
    let created = creations(events);
    let threshold = Duration::seconds(config.rapid_creation_seconds);
    let mut burst_start = 0;

    for i in 1..created.len() {
        let gap = created[i].timestamp - created[i - 1].timestamp;
        if gap >= threshold {
            burst_start = i;
            continue;
        }
        let burst = &created[burst_start..=i];
        if burst.len() >= config.rapid_creation_burst {
            let span = burst[burst.len() - 1].timestamp - burst[0].timestamp;
            return Some(Finding {
                alert_type: AlertType::RapidCreation,
                severity: AlertSeverity::Critical,
                description: format!(
                    "{} passes created within {} seconds, possible automation",
                    burst.len(),
                    span.num_seconds()
                ),
                details: json!({
                    "count": burst.len(),
                    "gap_threshold_seconds": config.rapid_creation_seconds,
                    "events": burst
                        .iter()
                        .map(|e| json!({ "id": e.id, "pass_id": e.pass_id, "timestamp": e.timestamp }))
                        .collect::<Vec<_>>(),
                }),
            });
        }
    }
    None
}

/// When the history last recorded an alert of `alert_type`.
fn last_reported(events: &[AuditEvent], alert_type: AlertType) -> Option<DateTime<Utc>> {
    events
        .iter()
        .filter(|e| e.event_type == AuditEventType::SuspiciousActivity)
        .filter(|e| e.details.get("type").and_then(|t| t.as_str()) == Some(alert_type.as_str()))
        .map(|e| e.timestamp)
        .max()
}

/// Activity outside school hours (MEDIUM) and on weekends (LOW), in the
/// school's local time. Alerts raised by the monitor itself are ignored, and
/// so is activity an earlier alert of the same type already covered.
pub fn unusual_patterns(events: &[AuditEvent], config: &MonitorConfig) -> Vec<Finding> {
    let offset = config.local_offset();
    let after_hours_seen = last_reported(events, AlertType::AfterHoursActivity);
    let weekend_seen = last_reported(events, AlertType::WeekendActivity);
    let unreported =
        |seen: Option<DateTime<Utc>>, e: &AuditEvent| seen.is_none_or(|at| e.timestamp > at);
    let mut after_hours = Vec::new();
    let mut weekend = Vec::new();

    for event in events
        .iter()
        .filter(|e| e.event_type != AuditEventType::SuspiciousActivity)
    {
        let local = event.timestamp.with_timezone(&offset);
        let hour = local.hour();
        if (hour < config.school_start_hour || hour >= config.school_end_hour)
            && unreported(after_hours_seen, event)
        {
            after_hours.push(event);
        }
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) && unreported(weekend_seen, event)
        {
            weekend.push(event);
        }
    }

    let summarize = |list: &[&AuditEvent]| {
        list.iter()
            .map(|e| json!({ "id": e.id, "type": e.event_type, "timestamp": e.timestamp }))
            .collect::<Vec<_>>()
    };

    let mut findings = Vec::new();
    if !after_hours.is_empty() {
        findings.push(Finding {
            alert_type: AlertType::AfterHoursActivity,
            severity: AlertSeverity::Medium,
            description: format!(
                "{} events outside school hours ({:02}:00-{:02}:00)",
                after_hours.len(),
                config.school_start_hour,
                config.school_end_hour
            ),
            details: json!({ "events": summarize(after_hours.as_slice()) }),
        });
    }
    if !weekend.is_empty() {
        findings.push(Finding {
            alert_type: AlertType::WeekendActivity,
            severity: AlertSeverity::Low,
            description: format!("{} events on a weekend", weekend.len()),
            details: json!({ "events": summarize(weekend.as_slice()) }),
        });
    }
    findings
}

/// An open pass past the warning (MEDIUM) or critical (HIGH) duration.
pub fn long_duration(pass: &Pass, now: DateTime<Utc>, config: &MonitorConfig) -> Option<Finding> {
    if !pass.is_open() {
        return None;
    }
    let minutes = pass.open_minutes(now);
    let (severity, threshold) = if minutes >= config.duration_critical_minutes {
        (AlertSeverity::High, config.duration_critical_minutes)
    } else if minutes >= config.duration_warning_minutes {
        (AlertSeverity::Medium, config.duration_warning_minutes)
    } else {
        return None;
    };

    Some(Finding {
        alert_type: AlertType::LongDuration,
        severity,
        description: format!("Pass open for {minutes} minutes (threshold {threshold} minutes)"),
        details: json!({
            "pass_id": pass.id,
            "elapsed_minutes": minutes,
            "threshold_minutes": threshold,
            "created_at": pass.created_at,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hallpass_core::types::{LocationId, PassId, StudentId};

    fn created_at(student: StudentId, at: DateTime<Utc>) -> AuditEvent {
        AuditEvent::new(student, AuditEventType::PassCreated, at)
    }

    /// A Wednesday at 10:00 UTC.
    fn school_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_fifteen_in_an_hour_is_high() {
        let student = StudentId::new();
        let now = school_morning();
        let events: Vec<_> = (0..15)
            .map(|i| created_at(student, now - Duration::minutes(i * 3)))
            .collect();

        let f = excessive_volume(&events, now, &MonitorConfig::default()).expect("finding");
        assert_eq!(f.alert_type, AlertType::ExcessivePasses);
        assert_eq!(f.severity, AlertSeverity::High);
        assert_eq!(f.details["count"], 15);
    }

    #[test]
    fn test_daily_volume_is_medium() {
        let student = StudentId::new();
        let now = school_morning();
        let events: Vec<_> = (0..26)
            .map(|i| created_at(student, now - Duration::minutes(30 + i * 40)))
            .collect();

        let f = excessive_volume(&events, now, &MonitorConfig::default()).expect("finding");
        assert_eq!(f.severity, AlertSeverity::Medium);
    }

    #[test]
    fn test_normal_volume_is_quiet() {
        let student = StudentId::new();
        let now = school_morning();
        let events = vec![created_at(student, now), created_at(student, now - Duration::hours(2))];
        assert!(excessive_volume(&events, now, &MonitorConfig::default()).is_none());
    }

    #[test]
    fn test_three_quick_creations_is_one_critical() {
        let student = StudentId::new();
        let t = school_morning();
        let events = vec![
            created_at(student, t),
            created_at(student, t + Duration::seconds(4)),
            created_at(student, t + Duration::seconds(8)),
            created_at(student, t + Duration::seconds(12)),
        ];
        let f = rapid_creation(&events, &MonitorConfig::default()).expect("finding");
        assert_eq!(f.severity, AlertSeverity::Critical);
        assert_eq!(f.details["count"], 3);
    }

    #[test]
    fn test_spaced_creations_are_not_rapid() {
        let student = StudentId::new();
        let t = school_morning();
        let events = vec![
            created_at(student, t),
            created_at(student, t + Duration::seconds(5)),
            created_at(student, t + Duration::seconds(30)),
            created_at(student, t + Duration::seconds(35)),
        ];
        assert!(rapid_creation(&events, &MonitorConfig::default()).is_none());
    }

    #[test]
    fn test_after_hours_and_weekend_are_separate() {
        let student = StudentId::new();
        // Saturday 2024-03-16 at 20:00 UTC.
        let saturday_night = Utc.with_ymd_and_hms(2024, 3, 16, 20, 0, 0).unwrap();
        let events = vec![
            created_at(student, saturday_night),
            created_at(student, school_morning()),
        ];

        let findings = unusual_patterns(&events, &MonitorConfig::default());
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].alert_type, AlertType::AfterHoursActivity);
        assert_eq!(findings[0].severity, AlertSeverity::Medium);
        assert_eq!(findings[1].alert_type, AlertType::WeekendActivity);
        assert_eq!(findings[1].severity, AlertSeverity::Low);
        assert_eq!(findings[0].details["events"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_local_offset_shifts_school_hours() {
        let student = StudentId::new();
        // 12:00 UTC is 07:00 at UTC-5, inside hours; at UTC+0 it is also inside.
        // 05:00 UTC is 00:00 at UTC-5, outside.
        let config = MonitorConfig {
            utc_offset_minutes: -300,
            ..MonitorConfig::default()
        };
        let inside = Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2024, 3, 13, 5, 0, 0).unwrap();

        assert!(unusual_patterns(&[created_at(student, inside)], &config).is_empty());
        assert_eq!(unusual_patterns(&[created_at(student, outside)], &config).len(), 1);
    }

    #[test]
    fn test_reported_after_hours_activity_is_not_raised_again() {
        let student = StudentId::new();
        let last_night = Utc.with_ymd_and_hms(2024, 3, 12, 21, 0, 0).unwrap();
        let reported = AuditEvent::new(
            student,
            AuditEventType::SuspiciousActivity,
            last_night + Duration::minutes(1),
        )
        .with_details(json!({ "type": "AFTER_HOURS_ACTIVITY", "severity": "MEDIUM" }));
        let mut events = vec![
            created_at(student, last_night),
            reported,
            created_at(student, school_morning()),
        ];
        let config = MonitorConfig::default();

        assert!(unusual_patterns(&events, &config).is_empty());

        let tonight = Utc.with_ymd_and_hms(2024, 3, 13, 22, 0, 0).unwrap();
        events.push(created_at(student, tonight));
        let findings = unusual_patterns(&events, &config);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].details["events"].as_array().map(Vec::len), Some(1));
    }

    fn open_pass(created: DateTime<Utc>) -> Pass {
        Pass::open(
            PassId::new(),
            StudentId::new(),
            LocationId::new(),
            LocationId::new(),
            created,
        )
    }

    #[test]
    fn test_sixty_five_minutes_is_high_only() {
        let now = school_morning();
        let pass = open_pass(now - Duration::minutes(65));
        let f = long_duration(&pass, now, &MonitorConfig::default()).expect("finding");
        assert_eq!(f.severity, AlertSeverity::High);
        assert!(f.description.contains("65"));
        assert!(f.description.contains("60"));
    }

    #[test]
    fn test_forty_minutes_is_medium() {
        let now = school_morning();
        let pass = open_pass(now - Duration::minutes(40));
        let f = long_duration(&pass, now, &MonitorConfig::default()).expect("finding");
        assert_eq!(f.severity, AlertSeverity::Medium);
    }

    #[test]
    fn test_closed_pass_is_ignored() {
        let now = school_morning();
        let mut pass = open_pass(now - Duration::minutes(90));
        pass.mark_closed("Ms. Okafor", now);
        assert!(long_duration(&pass, now, &MonitorConfig::default()).is_none());
    }
}
