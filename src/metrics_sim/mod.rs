// Metrics simulator: periodic bounded random-walk over host resources,
// network interface counters and the process table.
// One ticker task owns three independent intervals; each arm mutates disjoint state.

mod seed;
pub mod walk;

pub use seed::{MetricsSeed, default_interfaces, default_processes, default_storage};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, interval_at};

use crate::clock::now_ms;
use crate::config::{MetricsConfig, WalkConfig};
use crate::models::{
    NetworkInterface, ProcessInfo, ResourceSnapshot, ResourceView, StorageDevice, StorageReport,
    StorageSummary,
};
use crate::notify::{Notifier, Subscription, SubscriptionHandle};

/// Refresh periods for the three independent timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsCadence {
    pub resources: Duration,
    pub network: Duration,
    pub processes: Duration,
}

impl MetricsCadence {
    pub fn from_config(config: &MetricsConfig) -> Self {
        Self {
            resources: Duration::from_millis(config.resource_tick_ms),
            network: Duration::from_millis(config.network_tick_ms),
            processes: Duration::from_millis(config.process_tick_ms),
        }
    }

    /// Replaces zero periods (which a timer cannot run at) with `fallback`'s.
    fn or_default_periods(self, fallback: MetricsCadence) -> Self {
        let pick = |name: &str, period: Duration, default: Duration| {
            if period.is_zero() {
                tracing::warn!(
                    operation = "metrics_start",
                    timer = name,
                    default_ms = default.as_millis() as u64,
                    "zero refresh period; using default"
                );
                default
            } else {
                period
            }
        };
        Self {
            resources: pick("resources", self.resources, fallback.resources),
            network: pick("network", self.network, fallback.network),
            processes: pick("processes", self.processes, fallback.processes),
        }
    }
}

impl Default for MetricsCadence {
    fn default() -> Self {
        Self::from_config(&MetricsConfig::default())
    }
}

/// Published on every tick; serializes as `{"type": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum MetricsUpdate {
    Resources(ResourceSnapshot),
    Interfaces(Vec<NetworkInterface>),
    Processes(Vec<ProcessInfo>),
}

struct MetricsState {
    resources: ResourceSnapshot,
    interfaces: Vec<NetworkInterface>,
    processes: Vec<ProcessInfo>,
    rng: StdRng,
    /// Bumped on every start/stop; a ticker only mutates while its generation is current.
    generation: u64,
    ticks_total: u64,
}

struct Ticker {
    cadence: MetricsCadence,
    shutdown_tx: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

#[derive(Default)]
struct Control {
    ticker: Option<Ticker>,
    leases: usize,
}

pub struct MetricsSimulator {
    state: Arc<Mutex<MetricsState>>,
    control: Mutex<Control>,
    notifier: Arc<Notifier<MetricsUpdate>>,
    walk: Arc<WalkConfig>,
    default_cadence: MetricsCadence,
    storage: Vec<StorageDevice>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MetricsSimulator {
    /// Default host inventory, entropy-seeded RNG, advanced by one tick so the
    /// first read is already a plausible snapshot.
    pub fn new(config: &MetricsConfig) -> Self {
        let now = now_ms();
        let mut seed = MetricsSeed::default_host(&config.walk, now);
        let mut rng = StdRng::from_entropy();
        seed.resources = walk::next_resources(&mut rng, &seed.resources, &config.walk, now);
        Self::with_rng(config, seed, rng)
    }

    /// Exact initial state and RNG (deterministic tests).
    pub fn with_rng(config: &MetricsConfig, seed: MetricsSeed, rng: StdRng) -> Self {
        let MetricsSeed {
            resources,
            interfaces,
            processes,
            storage,
        } = seed;
        Self {
            state: Arc::new(Mutex::new(MetricsState {
                resources,
                interfaces,
                processes,
                rng,
                generation: 0,
                ticks_total: 0,
            })),
            control: Mutex::new(Control::default()),
            notifier: Arc::new(Notifier::new("metrics", config.broadcast_capacity)),
            walk: Arc::new(config.walk.clone()),
            default_cadence: MetricsCadence::from_config(config)
                .or_default_periods(MetricsCadence::default()),
            storage,
        }
    }

    /// Begins periodic refresh. No-op if already running at `cadence`; restarts
    /// the ticker if running at a different cadence. Zero periods fall back to the
    /// configured ones. Must be called inside a Tokio runtime.
    pub fn start(&self, cadence: MetricsCadence) {
        let mut control = lock(&self.control);
        self.start_locked(&mut control, cadence);
    }

    fn start_locked(&self, control: &mut Control, cadence: MetricsCadence) {
        let cadence = cadence.or_default_periods(self.default_cadence);
        if let Some(ticker) = control.ticker.as_ref()
            && ticker.cadence == cadence
            && !ticker.handle.is_finished()
        {
            return;
        }
        let _ = self.halt_locked(control);

        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.generation
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_ticker(
            self.state.clone(),
            self.notifier.clone(),
            self.walk.clone(),
            cadence,
            generation,
            shutdown_rx,
        ));
        tracing::debug!(
            operation = "metrics_start",
            resources_ms = cadence.resources.as_millis() as u64,
            network_ms = cadence.network.as_millis() as u64,
            processes_ms = cadence.processes.as_millis() as u64,
            "metrics ticker started"
        );
        control.ticker = Some(Ticker {
            cadence,
            shutdown_tx,
            handle,
        });
    }

    /// Halts periodic refresh. Any tick already in flight becomes a no-op.
    pub fn stop(&self) {
        let mut control = lock(&self.control);
        let _ = self.halt_locked(&mut control);
    }

    /// Stops the ticker and waits for its task to finish (application shutdown).
    pub async fn shutdown(&self) {
        let handle = {
            let mut control = lock(&self.control);
            self.halt_locked(&mut control)
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn halt_locked(&self, control: &mut Control) -> Option<tokio::task::JoinHandle<()>> {
        let ticker = control.ticker.take()?;
        lock(&self.state).generation += 1;
        let _ = ticker.shutdown_tx.send(());
        tracing::debug!(operation = "metrics_stop", "metrics ticker stopped");
        Some(ticker.handle)
    }

    /// Registers a consumer. Starts the ticker at the configured cadence if it is
    /// not already running; dropping the last lease stops it.
    pub fn acquire(self: &Arc<Self>) -> MetricsLease {
        let mut control = lock(&self.control);
        control.leases += 1;
        if control
            .ticker
            .as_ref()
            .is_none_or(|t| t.handle.is_finished())
        {
            let cadence = self.default_cadence;
            self.start_locked(&mut control, cadence);
        }
        MetricsLease { sim: self.clone() }
    }

    fn release(&self) {
        let mut control = lock(&self.control);
        control.leases = control.leases.saturating_sub(1);
        if control.leases == 0 {
            let _ = self.halt_locked(&mut control);
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.control)
            .ticker
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    pub fn cadence(&self) -> Option<MetricsCadence> {
        lock(&self.control).ticker.as_ref().map(|t| t.cadence)
    }

    pub fn default_cadence(&self) -> MetricsCadence {
        self.default_cadence
    }

    pub fn lease_count(&self) -> usize {
        lock(&self.control).leases
    }

    pub fn ticks_total(&self) -> u64 {
        lock(&self.state).ticks_total
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        lock(&self.state).resources.clone()
    }

    pub fn resource_view(&self) -> ResourceView {
        let snapshot = self.snapshot();
        let uptime_secs = snapshot.uptime_secs(now_ms());
        ResourceView {
            snapshot,
            uptime_secs,
        }
    }

    pub fn interfaces(&self) -> Vec<NetworkInterface> {
        lock(&self.state).interfaces.clone()
    }

    pub fn processes(&self) -> Vec<ProcessInfo> {
        lock(&self.state).processes.clone()
    }

    pub fn storage(&self) -> StorageReport {
        StorageReport {
            devices: self.storage.clone(),
            summary: StorageSummary::from_devices(&self.storage),
        }
    }

    pub fn subscribe(&self) -> Subscription<MetricsUpdate> {
        self.notifier.subscribe()
    }

    pub fn on_event<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: FnMut(MetricsUpdate) + Send + 'static,
    {
        self.notifier.on_event(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }
}

/// Keeps the ticker alive while held. See [`MetricsSimulator::acquire`].
pub struct MetricsLease {
    sim: Arc<MetricsSimulator>,
}

impl MetricsLease {
    pub fn simulator(&self) -> &Arc<MetricsSimulator> {
        &self.sim
    }
}

impl Drop for MetricsLease {
    fn drop(&mut self) {
        self.sim.release();
    }
}

async fn run_ticker(
    state: Arc<Mutex<MetricsState>>,
    notifier: Arc<Notifier<MetricsUpdate>>,
    walk: Arc<WalkConfig>,
    cadence: MetricsCadence,
    generation: u64,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let start = Instant::now();
    let mut resource_tick = interval_at(start + cadence.resources, cadence.resources);
    resource_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut network_tick = interval_at(start + cadence.network, cadence.network);
    network_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut process_tick = interval_at(start + cadence.processes, cadence.processes);
    process_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        let kind = tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = resource_tick.tick() => TickKind::Resources,
            _ = network_tick.tick() => TickKind::Network,
            _ = process_tick.tick() => TickKind::Processes,
        };
        if !apply_tick(&state, &notifier, &walk, generation, kind) {
            break;
        }
    }
    tracing::debug!(generation, "metrics ticker exited");
}

#[derive(Debug, Clone, Copy)]
enum TickKind {
    Resources,
    Network,
    Processes,
}

/// One tick of one timer. Returns false (without mutating) once `generation` is stale.
/// Publishing happens under the state lock so nothing is published after stop().
fn apply_tick(
    state: &Mutex<MetricsState>,
    notifier: &Notifier<MetricsUpdate>,
    walk: &WalkConfig,
    generation: u64,
    kind: TickKind,
) -> bool {
    let mut guard = lock(state);
    let s = &mut *guard;
    if s.generation != generation {
        return false;
    }
    let update = match kind {
        TickKind::Resources => {
            s.resources = walk::next_resources(&mut s.rng, &s.resources, walk, now_ms());
            MetricsUpdate::Resources(s.resources.clone())
        }
        TickKind::Network => {
            walk::advance_interfaces(&mut s.rng, &mut s.interfaces, walk);
            MetricsUpdate::Interfaces(s.interfaces.clone())
        }
        TickKind::Processes => {
            walk::advance_processes(&mut s.rng, &mut s.processes, walk);
            MetricsUpdate::Processes(s.processes.clone())
        }
    };
    s.ticks_total += 1;
    notifier.publish(update);
    true
}
