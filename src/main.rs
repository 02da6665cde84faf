//! HallPass daemon
//!
//! Wires the pass lifecycle engine over the in-memory backends, runs the
//! maintenance scheduler and logs domain events until interrupted.

use std::sync::Arc;

use chrono::Duration;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use hallpass_auth::policy::PolicyEngine;
use hallpass_auth::rate_limit::{MemoryRateLimitStore, RateLimiter};
use hallpass_core::config::AppConfig;
use hallpass_core::error::AppError;
use hallpass_core::events::EventBus;
use hallpass_database::memory::{
    MemoryEventLogRepository, MemoryLocationRepository, MemoryPassRepository,
    MemoryPolicyRepository, MemorySettingsRepository,
};
use hallpass_database::repositories::SettingsRepository;
use hallpass_monitor::{AlertRegistry, AuditMonitor};
use hallpass_service::{PassService, PassServiceDeps, PassStateMachine, PolicyService};
use hallpass_worker::{MaintenanceScheduler, MaintenanceTasks};

#[tokio::main]
async fn main() {
    let env = std::env::var("HALLPASS_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Daemon error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(config.logging.thread_ids)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(config.logging.thread_ids)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting HallPass v{}", env!("CARGO_PKG_VERSION"));

    let events = EventBus::default();

    // Repositories
    let settings = Arc::new(MemorySettingsRepository::new());
    settings
        .set_emergency_mode(config.policy.emergency_mode)
        .await?;
    let locations = Arc::new(MemoryLocationRepository::new());
    let policies = Arc::new(MemoryPolicyRepository::new());
    let history = Arc::new(MemoryEventLogRepository::new());
    let passes = Arc::new(MemoryPassRepository::new(settings.clone()));

    // Gatekeeping
    let limiter = RateLimiter::new(
        config.rate_limit.clone(),
        Arc::new(MemoryRateLimitStore::new()),
        events.clone(),
    );
    let policy = PolicyService::new(
        PolicyEngine::new(config.policy),
        policies,
        settings,
    );

    // Monitoring
    let registry = Arc::new(AlertRegistry::new(Duration::seconds(
        config.monitor.dedup_window_seconds,
    )));
    let monitor = Arc::new(AuditMonitor::new(
        config.monitor.clone(),
        registry,
        history.clone(),
        events.clone(),
    ));

    // Embedders hold the service; the daemon keeps it alive for the scheduler's lifetime.
    let _service = PassService::new(PassServiceDeps {
        config: config.passes.clone(),
        passes: passes.clone(),
        history,
        machine: Arc::new(PassStateMachine::new(locations)),
        policy,
        limiter: limiter.clone(),
        monitor: monitor.clone(),
        events: events.clone(),
    });
    tracing::info!(
        max_creation_attempts = config.passes.max_creation_attempts,
        "Pass service ready"
    );

    let mut scheduler = if config.worker.enabled {
        let tasks = Arc::new(MaintenanceTasks::new(limiter, monitor, passes));
        let scheduler = MaintenanceScheduler::new(tasks, config.worker.clone()).await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance scheduler disabled");
        None
    };

    let mut subscriber = events.subscribe();
    let event_log = tokio::spawn(async move {
        loop {
            match subscriber.recv().await {
                Ok(event) => tracing::debug!(event_id = %event.id, payload = ?event.payload, "Domain event"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Domain event log lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {e}")))?;
    tracing::info!("Shutdown signal received");

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    event_log.abort();

    tracing::info!("HallPass stopped");
    Ok(())
}
