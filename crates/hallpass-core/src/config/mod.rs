//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section has a `Default` so the engine can be built
//! without any files on disk (tests do this).

pub mod logging;
pub mod monitor;
pub mod passes;
pub mod policy;
pub mod rate_limit;
pub mod worker;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::logging::LoggingConfig;
pub use self::monitor::MonitorConfig;
pub use self::passes::PassConfig;
pub use self::policy::PolicyConfig;
pub use self::rate_limit::{RateLimitConfig, RateLimitRule};
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// (default.toml + environment overlay + `HALLPASS__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,
    /// Per-operation rate limits.
    #[serde(default)]
    #[validate(nested)]
    pub rate_limit: RateLimitConfig,
    /// Policy engine step toggles.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Pass creation settings.
    #[serde(default)]
    #[validate(nested)]
    pub passes: PassConfig,
    /// Audit monitor thresholds.
    #[serde(default)]
    #[validate(nested)]
    pub monitor: MonitorConfig,
    /// Maintenance schedules.
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// and environment variables prefixed with `HALLPASS__`, then checks
    /// every numeric range.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HALLPASS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.check()?;
        Ok(loaded)
    }

    /// Validate ranges and cross-field constraints.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        self.rate_limit.check_rules()?;
        self.monitor.check_school_hours()?;
        Ok(())
    }
}
