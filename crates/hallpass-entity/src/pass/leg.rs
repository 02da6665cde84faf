//! Leg entity: one directed segment of a pass journey.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::types::{LegId, LocationId};

/// Presence state of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegState {
    /// Travelling toward the destination, arrival not yet confirmed.
    Out,
    /// Confirmed present at the destination.
    In,
}

impl LegState {
    /// Return the state as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Out => "OUT",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for LegState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One directed segment of a student's journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Unique leg identifier.
    pub id: LegId,
    /// 1-based position within the pass.
    pub leg_number: u32,
    /// Where this segment starts.
    pub origin_location_id: LocationId,
    /// Where this segment ends.
    pub destination_location_id: LocationId,
    /// Presence state at the destination.
    pub state: LegState,
    /// When the leg was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Leg {
    /// Whether the leg is a travel segment (not yet confirmed).
    pub fn is_out(&self) -> bool {
        self.state == LegState::Out
    }

    /// Whether the leg moves the student somewhere else.
    pub fn is_travel(&self) -> bool {
        self.origin_location_id != self.destination_location_id
    }
}
