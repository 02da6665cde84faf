//! Named pass actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Something a caller can ask to do with a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassAction {
    /// Open a new pass.
    Create,
    /// Confirm arrival at the current destination.
    Arrive,
    /// Head back to the assigned location.
    ReturnToClass,
    /// Come back from a restroom trip.
    RestroomReturn,
    /// Travel somewhere new from the current destination.
    NewDestination,
    /// Administrative close.
    ClosePass,
}

impl PassAction {
    /// Actions that act on an existing pass.
    pub const TRANSITIONS: [PassAction; 5] = [
        Self::Arrive,
        Self::ReturnToClass,
        Self::RestroomReturn,
        Self::NewDestination,
        Self::ClosePass,
    ];

    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Arrive => "arrive",
            Self::ReturnToClass => "return_to_class",
            Self::RestroomReturn => "restroom_return",
            Self::NewDestination => "new_destination",
            Self::ClosePass => "close_pass",
        }
    }

    /// Whether the action mutates an existing pass.
    pub fn is_transition(&self) -> bool {
        !matches!(self, Self::Create)
    }
}

impl fmt::Display for PassAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "arrive" => Ok(Self::Arrive),
            "return_to_class" => Ok(Self::ReturnToClass),
            "restroom_return" => Ok(Self::RestroomReturn),
            "new_destination" => Ok(Self::NewDestination),
            "close_pass" => Ok(Self::ClosePass),
            other => Err(format!("Unknown pass action: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for action in PassAction::TRANSITIONS {
            assert_eq!(action.as_str().parse::<PassAction>(), Ok(action));
        }
        assert!("teleport".parse::<PassAction>().is_err());
    }
}
