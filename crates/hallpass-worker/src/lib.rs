//! Scheduled maintenance for HallPass.
//!
//! This crate provides:
//! - Maintenance task bodies that prune and rescan in-memory state
//! - A cron scheduler that runs each task on its configured schedule

pub mod scheduler;
pub mod tasks;

pub use scheduler::MaintenanceScheduler;
pub use tasks::MaintenanceTasks;
