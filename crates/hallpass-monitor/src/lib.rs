//! # hallpass-monitor
//!
//! Post-hoc anomaly detection for pass activity.
//!
//! ## Modules
//!
//! - `checks` - pure detectors over event history and open passes
//! - `registry` - append-only in-memory alert store with deduplication
//! - `metrics` - alert counts and summaries
//! - `monitor` - the audit monitor tying detectors, registry and history together

pub mod checks;
pub mod metrics;
pub mod monitor;
pub mod registry;

pub use checks::Finding;
pub use metrics::MonitorMetrics;
pub use monitor::AuditMonitor;
pub use registry::AlertRegistry;
