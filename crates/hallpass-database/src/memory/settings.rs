//! In-memory settings.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::info;

use hallpass_core::result::AppResult;

use crate::repositories::SettingsRepository;

/// Settings held in process memory.
#[derive(Debug, Default)]
pub struct MemorySettingsRepository {
    emergency_mode: AtomicBool,
}

impl MemorySettingsRepository {
    /// Create settings with emergency mode off.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn emergency_mode(&self) -> AppResult<bool> {
        Ok(self.emergency_mode.load(Ordering::Acquire))
    }

    async fn set_emergency_mode(&self, enabled: bool) -> AppResult<()> {
        let previous = self.emergency_mode.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(enabled, "Emergency mode changed");
        }
        Ok(())
    }
}
