//! Movement policy entities: restrictions, groups, and location rules.

pub mod group;
pub mod restriction;
pub mod rule;

pub use group::{Group, GroupType};
pub use restriction::{Restriction, RestrictionType};
pub use rule::{LocationRule, RuleDecision};
