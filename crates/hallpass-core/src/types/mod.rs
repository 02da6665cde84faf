//! Core type definitions used across the HallPass workspace.

pub mod id;

pub use id::*;
