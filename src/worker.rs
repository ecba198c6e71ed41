// Background app-stats worker and command-outcome logging.
// The simulators run their own timers; this only observes them.

use crate::lifecycle::{LifecycleEvent, LifecycleSimulator};
use crate::metrics_sim::MetricsSimulator;
use crate::models::EntityStatus;
use crate::notify::SubscriptionHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, interval};

/// Simulators, counters and shutdown for the worker.
pub struct WorkerDeps {
    pub metrics: Arc<MetricsSimulator>,
    pub lifecycle: Arc<LifecycleSimulator>,
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        metrics,
        lifecycle,
        ws_connections,
        mut shutdown_rx,
    } = deps;
    let stats_log_interval = Duration::from_secs(config.stats_log_interval_secs);

    tokio::spawn(async move {
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately; skip it so the first log comes after one interval.
        stats_log_tick.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    let counts = lifecycle.count_by_status(None);
                    tracing::info!(
                        ws_clients = ws_connections.load(Ordering::Relaxed),
                        metrics_running = metrics.is_running(),
                        metrics_leases = metrics.lease_count(),
                        metric_ticks_total = metrics.ticks_total(),
                        entities_running = counts.get(EntityStatus::Running),
                        entities_total = counts.total,
                        commands_pending = lifecycle.pending_count(),
                        "app stats"
                    );
                }
            }
        }
    })
}

/// Logs every command outcome, the server-side counterpart of a UI toast.
pub fn log_command_outcomes(lifecycle: &LifecycleSimulator) -> SubscriptionHandle {
    lifecycle.on_event(|event| {
        if let LifecycleEvent::CommandCompleted(outcome) = event {
            if outcome.success {
                tracing::info!(
                    entity_id = %outcome.entity_id,
                    action = %outcome.action,
                    status = %outcome.status,
                    "command completed"
                );
            } else {
                tracing::info!(
                    entity_id = %outcome.entity_id,
                    action = %outcome.action,
                    reason = ?outcome.reason,
                    "command did not complete"
                );
            }
        }
    })
}
