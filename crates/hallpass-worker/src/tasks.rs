//! Maintenance task bodies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::info;

use hallpass_auth::rate_limit::RateLimiter;
use hallpass_core::result::AppResult;
use hallpass_database::repositories::PassRepository;
use hallpass_monitor::AuditMonitor;

/// Periodic upkeep over the limiter, the alert registry and open passes.
#[derive(Debug, Clone)]
pub struct MaintenanceTasks {
    /// Rate limiter whose elapsed windows are swept.
    limiter: RateLimiter,
    /// Monitor owning the alert registry and duration checks.
    monitor: Arc<AuditMonitor>,
    /// Pass repository scanned for open passes.
    passes: Arc<dyn PassRepository>,
}

impl MaintenanceTasks {
    /// Create the task set.
    pub fn new(
        limiter: RateLimiter,
        monitor: Arc<AuditMonitor>,
        passes: Arc<dyn PassRepository>,
    ) -> Self {
        Self {
            limiter,
            monitor,
            passes,
        }
    }

    /// Drop rate-limit entries whose window has ended.
    pub async fn sweep_rate_limits(&self, now: DateTime<Utc>) -> AppResult<usize> {
        self.limiter.cleanup_at(now).await
    }

    /// Drop alerts older than the retention period.
    pub fn sweep_alerts(&self, now: DateTime<Utc>) -> usize {
        let removed = self.monitor.sweep_alerts(now);
        info!(removed, "Alert retention sweep finished");
        removed
    }

    /// Run the duration check over every open pass.
    ///
    /// Returns how many alerts were raised. Passes already alerted inside
    /// the dedup window are not raised again unless the severity went up.
    pub async fn scan_open_passes(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let open = self.passes.list_open().await?;
        let scanned = open.len();

        let raised = join_all(
            open.iter()
                .map(|pass| self.monitor.check_pass_duration_at(pass, now)),
        )
        .await
        .into_iter()
        .flatten()
        .count();

        info!(scanned, raised, "Open pass scan finished");
        Ok(raised)
    }
}
