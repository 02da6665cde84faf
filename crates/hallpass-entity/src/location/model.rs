//! Location entity model.

use std::fmt;

use serde::{Deserialize, Serialize};

use hallpass_core::types::LocationId;

/// Kind of supervised location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    /// A classroom with an assigned instructor.
    Classroom,
    /// A restroom. Trips here return without an arrival confirmation.
    Bathroom,
    /// Front office, counselling, administration.
    Office,
    /// Library or media center.
    Library,
    /// Nurse or health office.
    Nurse,
    /// Anything else.
    Other,
}

impl LocationType {
    /// Whether trips to this location use the restroom flow.
    pub fn is_bathroom(&self) -> bool {
        matches!(self, Self::Bathroom)
    }

    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classroom => "classroom",
            Self::Bathroom => "bathroom",
            Self::Office => "office",
            Self::Library => "library",
            Self::Nurse => "nurse",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type and friendly name of a location, as resolved by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Location identifier.
    pub id: LocationId,
    /// Human-readable name, e.g. `"Room 204"`.
    pub name: String,
    /// Location kind.
    pub location_type: LocationType,
}

impl LocationInfo {
    /// Create a location record.
    pub fn new(id: LocationId, name: impl Into<String>, location_type: LocationType) -> Self {
        Self {
            id,
            name: name.into(),
            location_type,
        }
    }

    /// Whether this location is a restroom.
    pub fn is_bathroom(&self) -> bool {
        self.location_type.is_bathroom()
    }
}
