//! Global settings trait.

use async_trait::async_trait;

use hallpass_core::result::AppResult;

/// School-wide switches that can change at runtime.
#[async_trait]
pub trait SettingsRepository: Send + Sync + std::fmt::Debug {
    /// Whether emergency mode is active.
    async fn emergency_mode(&self) -> AppResult<bool>;

    /// Turn emergency mode on or off.
    async fn set_emergency_mode(&self, enabled: bool) -> AppResult<()>;
}
