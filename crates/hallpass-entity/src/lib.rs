//! # hallpass-entity
//!
//! Domain entity models for HallPass. Every struct in this crate is
//! either a record handed to/from a persistence collaborator or a domain
//! value object. All entities derive `Debug`, `Clone`, `Serialize` and
//! `Deserialize`; status and state fields are closed enums.

pub mod alert;
pub mod event;
pub mod location;
pub mod pass;
pub mod policy;
pub mod student;
