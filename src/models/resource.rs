// Resource snapshot models (cpu, memory, storage, network, temperature, uptime)

use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` range a simulated field is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One immutable read of the simulated host resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    /// Wall-clock ms of the tick that produced this snapshot.
    pub timestamp: u64,
    pub cpu: f64,
    pub memory: f64,
    pub storage: f64,
    /// Instantaneous throughput percentage; redrawn every tick.
    pub network: f64,
    pub temperature: f64,
    /// Simulated boot time (ms since epoch). Fixed for the lifetime of a simulator.
    pub uptime_epoch_ms: u64,
}

impl ResourceSnapshot {
    /// Seconds elapsed since the simulated boot, relative to `now_ms`.
    pub fn uptime_secs(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.uptime_epoch_ms) / 1000
    }
}

/// Snapshot plus derived uptime, as served to dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    #[serde(flatten)]
    pub snapshot: ResourceSnapshot,
    pub uptime_secs: u64,
}
