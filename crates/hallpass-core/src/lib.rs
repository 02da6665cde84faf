//! # hallpass-core
//!
//! Core crate for HallPass. Contains configuration schemas, typed
//! identifiers, domain events with the in-process event bus, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other HallPass crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
