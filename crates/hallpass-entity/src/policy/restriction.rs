//! Restriction entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::types::{LocationId, RestrictionId, StudentId};

/// Scope of a restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionType {
    /// Blocks every movement.
    #[serde(rename = "Global")]
    Global,
    /// Blocks leaving one specific location.
    #[serde(rename = "Class-Level")]
    ClassLevel,
}

/// An administrative block on a student's movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Restriction identifier.
    pub id: RestrictionId,
    /// The restricted student.
    pub student_id: StudentId,
    /// Global or class-level.
    pub restriction_type: RestrictionType,
    /// Manual on/off switch.
    pub is_active: bool,
    /// For class-level restrictions, the location it applies to.
    pub location_id: Option<LocationId>,
    /// Optional automatic expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Why the restriction exists.
    pub reason: Option<String>,
}

impl Restriction {
    /// Active iff switched on and not yet expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map(|exp| exp > now).unwrap_or(true)
    }

    /// Whether this is a class-level restriction scoped to `location`.
    pub fn applies_to_location(&self, location: LocationId) -> bool {
        self.restriction_type == RestrictionType::ClassLevel
            && self.location_id == Some(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn restriction(expires_at: Option<DateTime<Utc>>, is_active: bool) -> Restriction {
        Restriction {
            id: RestrictionId::new(),
            student_id: StudentId::new(),
            restriction_type: RestrictionType::Global,
            is_active,
            location_id: None,
            expires_at,
            reason: None,
        }
    }

    #[test]
    fn test_expiry_controls_activity() {
        let now = Utc::now();
        assert!(restriction(None, true).is_active_at(now));
        assert!(restriction(Some(now + Duration::hours(1)), true).is_active_at(now));
        assert!(!restriction(Some(now - Duration::seconds(1)), true).is_active_at(now));
        assert!(!restriction(None, false).is_active_at(now));
    }

    #[test]
    fn test_restriction_type_wire_names() {
        let json = serde_json::to_string(&RestrictionType::ClassLevel).expect("serialize");
        assert_eq!(json, "\"Class-Level\"");
    }
}
