use serde::Deserialize;

use crate::models::FieldBounds;

/// Resource snapshot refresh period.
pub const DEFAULT_RESOURCE_TICK_MS: u64 = 2000;
/// Network interface counter refresh period.
pub const DEFAULT_NETWORK_TICK_MS: u64 = 3000;
/// Process table refresh period.
pub const DEFAULT_PROCESS_TICK_MS: u64 = 5000;
/// Simulated time for a service command to resolve.
pub const DEFAULT_SERVICE_LATENCY_MS: u64 = 2000;
/// Simulated time for a container command to resolve.
pub const DEFAULT_CONTAINER_LATENCY_MS: u64 = 1500;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_resource_tick_ms")]
    pub resource_tick_ms: u64,
    #[serde(default = "default_network_tick_ms")]
    pub network_tick_ms: u64,
    #[serde(default = "default_process_tick_ms")]
    pub process_tick_ms: u64,
    /// Max number of metric updates buffered per subscriber (slow clients may lag).
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
    #[serde(default)]
    pub walk: WalkConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            resource_tick_ms: DEFAULT_RESOURCE_TICK_MS,
            network_tick_ms: DEFAULT_NETWORK_TICK_MS,
            process_tick_ms: DEFAULT_PROCESS_TICK_MS,
            broadcast_capacity: default_broadcast_capacity(),
            walk: WalkConfig::default(),
        }
    }
}

/// A field that moves by `uniform(-delta, delta)` per tick, clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SmoothedField {
    pub delta: f64,
    pub min: f64,
    pub max: f64,
}

impl SmoothedField {
    pub fn bounds(&self) -> FieldBounds {
        FieldBounds::new(self.min, self.max)
    }
}

/// Temperature is redrawn as `base + uniform(0, spread)` each tick, clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TemperatureField {
    pub base: f64,
    pub spread: f64,
    pub min: f64,
    pub max: f64,
}

impl TemperatureField {
    pub fn bounds(&self) -> FieldBounds {
        FieldBounds::new(self.min, self.max)
    }
}

/// Randomization bounds for every simulated metric.
#[derive(Debug, Clone, Deserialize)]
pub struct WalkConfig {
    #[serde(default = "default_cpu")]
    pub cpu: SmoothedField,
    #[serde(default = "default_memory")]
    pub memory: SmoothedField,
    #[serde(default = "default_storage")]
    pub storage: SmoothedField,
    /// Redrawn uniformly within these bounds every tick (not smoothed).
    #[serde(default = "default_network")]
    pub network: FieldBounds,
    #[serde(default = "default_temperature")]
    pub temperature: TemperatureField,
    /// Upper bound of the per-tick increase of each interface's received counter.
    #[serde(default = "default_bytes_received_cap")]
    pub bytes_received_cap: u64,
    /// Upper bound of the per-tick increase of each interface's sent counter.
    #[serde(default = "default_bytes_sent_cap")]
    pub bytes_sent_cap: u64,
    #[serde(default = "default_process_cpu_delta")]
    pub process_cpu_delta: f64,
    #[serde(default = "default_process_memory_delta")]
    pub process_memory_delta: f64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            cpu: default_cpu(),
            memory: default_memory(),
            storage: default_storage(),
            network: default_network(),
            temperature: default_temperature(),
            bytes_received_cap: default_bytes_received_cap(),
            bytes_sent_cap: default_bytes_sent_cap(),
            process_cpu_delta: default_process_cpu_delta(),
            process_memory_delta: default_process_memory_delta(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default = "default_service_latency_ms")]
    pub service_latency_ms: u64,
    #[serde(default = "default_container_latency_ms")]
    pub container_latency_ms: u64,
    /// Max number of lifecycle events buffered per subscriber.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            service_latency_ms: DEFAULT_SERVICE_LATENCY_MS,
            container_latency_ms: DEFAULT_CONTAINER_LATENCY_MS,
            event_capacity: default_event_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (ws clients, running entities, metric ticks) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_resource_tick_ms() -> u64 {
    DEFAULT_RESOURCE_TICK_MS
}

fn default_network_tick_ms() -> u64 {
    DEFAULT_NETWORK_TICK_MS
}

fn default_process_tick_ms() -> u64 {
    DEFAULT_PROCESS_TICK_MS
}

fn default_broadcast_capacity() -> usize {
    64
}

fn default_cpu() -> SmoothedField {
    SmoothedField {
        delta: 10.0,
        min: 0.0,
        max: 100.0,
    }
}

fn default_memory() -> SmoothedField {
    SmoothedField {
        delta: 5.0,
        min: 20.0,
        max: 90.0,
    }
}

fn default_storage() -> SmoothedField {
    SmoothedField {
        delta: 2.0,
        min: 10.0,
        max: 95.0,
    }
}

fn default_network() -> FieldBounds {
    FieldBounds::new(0.0, 100.0)
}

fn default_temperature() -> TemperatureField {
    TemperatureField {
        base: 45.0,
        spread: 20.0,
        min: 30.0,
        max: 80.0,
    }
}

fn default_bytes_received_cap() -> u64 {
    1_000_000
}

fn default_bytes_sent_cap() -> u64 {
    500_000
}

fn default_process_cpu_delta() -> f64 {
    1.0
}

fn default_process_memory_delta() -> f64 {
    0.5
}

fn default_service_latency_ms() -> u64 {
    DEFAULT_SERVICE_LATENCY_MS
}

fn default_container_latency_ms() -> u64 {
    DEFAULT_CONTAINER_LATENCY_MS
}

fn default_event_capacity() -> usize {
    128
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        let m = &self.metrics;
        anyhow::ensure!(
            m.resource_tick_ms > 0,
            "metrics.resource_tick_ms must be > 0, got {}",
            m.resource_tick_ms
        );
        anyhow::ensure!(
            m.network_tick_ms > 0,
            "metrics.network_tick_ms must be > 0, got {}",
            m.network_tick_ms
        );
        anyhow::ensure!(
            m.process_tick_ms > 0,
            "metrics.process_tick_ms must be > 0, got {}",
            m.process_tick_ms
        );
        anyhow::ensure!(
            m.broadcast_capacity > 0,
            "metrics.broadcast_capacity must be > 0, got {}",
            m.broadcast_capacity
        );
        for (name, field) in [
            ("cpu", m.walk.cpu),
            ("memory", m.walk.memory),
            ("storage", m.walk.storage),
        ] {
            anyhow::ensure!(
                field.delta >= 0.0,
                "metrics.walk.{}.delta must be >= 0, got {}",
                name,
                field.delta
            );
            anyhow::ensure!(
                field.min <= field.max,
                "metrics.walk.{}.min must be <= max, got {} > {}",
                name,
                field.min,
                field.max
            );
        }
        anyhow::ensure!(
            m.walk.network.min <= m.walk.network.max,
            "metrics.walk.network.min must be <= max, got {} > {}",
            m.walk.network.min,
            m.walk.network.max
        );
        let t = &m.walk.temperature;
        anyhow::ensure!(
            t.spread >= 0.0,
            "metrics.walk.temperature.spread must be >= 0, got {}",
            t.spread
        );
        anyhow::ensure!(
            t.min <= t.max,
            "metrics.walk.temperature.min must be <= max, got {} > {}",
            t.min,
            t.max
        );
        anyhow::ensure!(
            m.walk.process_cpu_delta >= 0.0 && m.walk.process_memory_delta >= 0.0,
            "metrics.walk.process_cpu_delta and process_memory_delta must be >= 0"
        );
        let l = &self.lifecycle;
        anyhow::ensure!(
            l.service_latency_ms > 0,
            "lifecycle.service_latency_ms must be > 0, got {}",
            l.service_latency_ms
        );
        anyhow::ensure!(
            l.container_latency_ms > 0,
            "lifecycle.container_latency_ms must be > 0, got {}",
            l.container_latency_ms
        );
        anyhow::ensure!(
            l.event_capacity > 0,
            "lifecycle.event_capacity must be > 0, got {}",
            l.event_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
