//! Typed identifiers for every HallPass entity.
//!
//! Each identifier is a distinct newtype over [`uuid::Uuid`] so a
//! `StudentId` can never be handed to an API expecting a `LocationId`.
//! Identifiers for append-only records (passes, legs, alerts, events)
//! are generated as UUIDv7 so they sort by creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident => $generator:path
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh identifier.
            pub fn new() -> Self {
                Self($generator())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Unwrap into the inner UUID.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Borrow the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// A staff member (instructor, administrator) acting on passes.
    UserId => Uuid::new_v4
);

define_id!(
    /// A student who can hold passes.
    StudentId => Uuid::new_v4
);

define_id!(
    /// A supervised location: classroom, bathroom, office, library.
    LocationId => Uuid::new_v4
);

define_id!(
    /// A student policy group.
    GroupId => Uuid::new_v4
);

define_id!(
    /// A movement restriction placed on a student.
    RestrictionId => Uuid::new_v4
);

define_id!(
    /// A hall pass.
    PassId => Uuid::now_v7
);

define_id!(
    /// One leg of a pass journey.
    LegId => Uuid::now_v7
);

define_id!(
    /// A suspicious-activity alert.
    AlertId => Uuid::now_v7
);

define_id!(
    /// An event-history record.
    EventId => Uuid::now_v7
);
