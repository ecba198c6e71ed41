// Shared test helpers

#![allow(dead_code)]

use nexus_dashboard::config::{LifecycleConfig, MetricsConfig};
use nexus_dashboard::lifecycle::{LifecycleEvent, LifecycleSimulator, default_entities};
use nexus_dashboard::metrics_sim::{MetricsSeed, MetricsSimulator};
use nexus_dashboard::models::*;
use nexus_dashboard::notify::Subscription;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const SERVICE_LATENCY_MS: u64 = 2000;
pub const CONTAINER_LATENCY_MS: u64 = 1500;

pub fn lifecycle_config() -> LifecycleConfig {
    LifecycleConfig {
        service_latency_ms: SERVICE_LATENCY_MS,
        container_latency_ms: CONTAINER_LATENCY_MS,
        event_capacity: 256,
    }
}

pub fn seeded_lifecycle(seed: Vec<ManagedEntity>) -> LifecycleSimulator {
    LifecycleSimulator::with_rng(seed, &lifecycle_config(), StdRng::seed_from_u64(42))
}

pub fn default_lifecycle() -> LifecycleSimulator {
    seeded_lifecycle(default_entities())
}

pub fn service(id: &str, name: &str, description: &str, status: EntityStatus) -> ManagedEntity {
    ManagedEntity {
        id: id.into(),
        kind: EntityKind::Service,
        display_name: name.into(),
        status,
        resource_usage: ResourceUsage::IDLE,
        limits: ResourceLimits {
            cpu_ceiling_percent: 5.0,
            memory_floor_mb: 20.0,
            memory_ceiling_mb: 120.0,
        },
        metadata: EntityMetadata {
            description: Some(description.into()),
            last_transition_at: "2024-01-15 10:30:45".into(),
            ..Default::default()
        },
    }
}

pub fn snapshot(cpu: f64) -> ResourceSnapshot {
    ResourceSnapshot {
        timestamp: 0,
        cpu,
        memory: 50.0,
        storage: 50.0,
        network: 50.0,
        temperature: 50.0,
        uptime_epoch_ms: 0,
    }
}

pub fn seeded_metrics(config: &MetricsConfig, resources: ResourceSnapshot, rng_seed: u64) -> MetricsSimulator {
    let mut seed = MetricsSeed::default_host(&config.walk, 1_000_000);
    seed.resources = resources;
    MetricsSimulator::with_rng(config, seed, StdRng::seed_from_u64(rng_seed))
}

/// Everything currently queued on a lifecycle subscription.
pub fn drain(sub: &mut Subscription<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut out = Vec::new();
    while let Some(event) = sub.try_recv() {
        out.push(event);
    }
    out
}

/// Sleeps `ms` of (paused) runtime time, letting due resolution tasks run first.
pub async fn elapse_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

pub fn outcomes(events: &[LifecycleEvent]) -> Vec<nexus_dashboard::lifecycle::CommandOutcome> {
    events
        .iter()
        .filter_map(|e| match e {
            LifecycleEvent::CommandCompleted(o) => Some(o.clone()),
            _ => None,
        })
        .collect()
}
