//! Cron scheduler for periodic maintenance.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use hallpass_core::config::WorkerConfig;
use hallpass_core::error::AppError;
use hallpass_core::result::AppResult;

use crate::tasks::MaintenanceTasks;

/// Runs [`MaintenanceTasks`] on the schedules from `[worker]`.
pub struct MaintenanceScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Task bodies shared by every job
    tasks: Arc<MaintenanceTasks>,
    /// Cron expressions
    config: WorkerConfig,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl MaintenanceScheduler {
    /// Create a new scheduler
    pub async fn new(tasks: Arc<MaintenanceTasks>, config: WorkerConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            tasks,
            config,
        })
    }

    /// Register every maintenance job
    pub async fn register_default_tasks(&self) -> AppResult<()> {
        let rate_limit_sweep = self.config.rate_limit_sweep.clone();
        self.register("rate_limit_sweep", &rate_limit_sweep, |tasks| async move {
            if let Err(e) = tasks.sweep_rate_limits(Utc::now()).await {
                tracing::error!(error = %e, "Rate limit sweep failed");
            }
        })
        .await?;

        let alert_retention_sweep = self.config.alert_retention_sweep.clone();
        self.register(
            "alert_retention_sweep",
            &alert_retention_sweep,
            |tasks| async move {
                tasks.sweep_alerts(Utc::now());
            },
        )
        .await?;

        let open_pass_scan = self.config.open_pass_scan.clone();
        self.register("open_pass_scan", &open_pass_scan, |tasks| async move {
            if let Err(e) = tasks.scan_open_passes(Utc::now()).await {
                tracing::error!(error = %e, "Open pass scan failed");
            }
        })
        .await?;

        tracing::info!("All maintenance tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler shut down");
        Ok(())
    }

    async fn register<F, Fut>(&self, name: &'static str, schedule: &str, run: F) -> AppResult<()>
    where
        F: Fn(Arc<MaintenanceTasks>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tasks = Arc::clone(&self.tasks);
        let run = Arc::new(run);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let tasks = Arc::clone(&tasks);
            let run = Arc::clone(&run);
            Box::pin(async move {
                tracing::debug!(task = name, "Running maintenance task");
                (*run)(tasks).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{schedule}' for {name}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!(task = name, schedule, "Registered maintenance task");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hallpass_auth::rate_limit::{MemoryRateLimitStore, RateLimiter};
    use hallpass_core::config::{MonitorConfig, RateLimitConfig};
    use hallpass_core::error::ErrorKind;
    use hallpass_core::events::EventBus;
    use hallpass_database::memory::{
        MemoryEventLogRepository, MemoryPassRepository, MemorySettingsRepository,
    };
    use hallpass_monitor::{AlertRegistry, AuditMonitor};

    fn tasks() -> Arc<MaintenanceTasks> {
        let events = EventBus::default();
        let monitor = Arc::new(AuditMonitor::new(
            MonitorConfig::default(),
            Arc::new(AlertRegistry::new(Duration::minutes(10))),
            Arc::new(MemoryEventLogRepository::new()),
            events.clone(),
        ));
        let limiter = RateLimiter::new(
            RateLimitConfig::default(),
            Arc::new(MemoryRateLimitStore::new()),
            events,
        );
        let passes = Arc::new(MemoryPassRepository::new(Arc::new(
            MemorySettingsRepository::new(),
        )));
        Arc::new(MaintenanceTasks::new(limiter, monitor, passes))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_default_schedules_register() {
        let mut scheduler = MaintenanceScheduler::new(tasks(), WorkerConfig::default())
            .await
            .unwrap();
        scheduler.register_default_tasks().await.unwrap();
        scheduler.start().await.unwrap();
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_cron_is_a_configuration_error() {
        let config = WorkerConfig {
            open_pass_scan: "every five minutes".to_string(),
            ..WorkerConfig::default()
        };
        let scheduler = MaintenanceScheduler::new(tasks(), config).await.unwrap();
        let err = scheduler.register_default_tasks().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("open_pass_scan"));
    }
}
