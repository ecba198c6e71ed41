// Bounded random-walk step functions. Pure: all randomness comes from the caller's RNG.

use rand::Rng;

use crate::config::WalkConfig;
use crate::models::{FieldBounds, NetworkInterface, ProcessInfo, ResourceSnapshot};

/// `clamp(prev + uniform(-delta, delta), min, max)`.
pub fn random_walk<R: Rng + ?Sized>(rng: &mut R, prev: f64, delta: f64, bounds: FieldBounds) -> f64 {
    let step = if delta > 0.0 {
        rng.gen_range(-delta..=delta)
    } else {
        0.0
    };
    bounds.clamp(prev + step)
}

/// Independent redraw within `bounds`.
pub fn redraw<R: Rng + ?Sized>(rng: &mut R, bounds: FieldBounds) -> f64 {
    if bounds.min < bounds.max {
        rng.gen_range(bounds.min..=bounds.max)
    } else {
        bounds.min
    }
}

/// Next resource snapshot from the previous one. The boot epoch is carried over unchanged.
pub fn next_resources<R: Rng + ?Sized>(
    rng: &mut R,
    prev: &ResourceSnapshot,
    walk: &WalkConfig,
    timestamp: u64,
) -> ResourceSnapshot {
    let t = &walk.temperature;
    let temperature = if t.spread > 0.0 {
        t.base + rng.gen_range(0.0..=t.spread)
    } else {
        t.base
    };
    ResourceSnapshot {
        timestamp,
        cpu: random_walk(rng, prev.cpu, walk.cpu.delta, walk.cpu.bounds()),
        memory: random_walk(rng, prev.memory, walk.memory.delta, walk.memory.bounds()),
        storage: random_walk(rng, prev.storage, walk.storage.delta, walk.storage.bounds()),
        network: redraw(rng, walk.network),
        temperature: t.bounds().clamp(temperature),
        uptime_epoch_ms: prev.uptime_epoch_ms,
    }
}

/// Bumps each interface's counters by `uniform(0, cap)`; counters never decrease.
pub fn advance_interfaces<R: Rng + ?Sized>(
    rng: &mut R,
    interfaces: &mut [NetworkInterface],
    walk: &WalkConfig,
) {
    for iface in interfaces.iter_mut() {
        let received = rng.gen_range(0..=walk.bytes_received_cap);
        let sent = rng.gen_range(0..=walk.bytes_sent_cap);
        iface.bytes_received = iface.bytes_received.saturating_add(received);
        iface.bytes_sent = iface.bytes_sent.saturating_add(sent);
    }
}

/// Per-process cpu/memory drift, floored at zero.
pub fn advance_processes<R: Rng + ?Sized>(
    rng: &mut R,
    processes: &mut [ProcessInfo],
    walk: &WalkConfig,
) {
    let floor = FieldBounds::new(0.0, f64::MAX);
    for proc in processes.iter_mut() {
        proc.cpu_percent = random_walk(rng, proc.cpu_percent, walk.process_cpu_delta, floor);
        proc.memory_percent =
            random_walk(rng, proc.memory_percent, walk.process_memory_delta, floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn snapshot(cpu: f64) -> ResourceSnapshot {
        ResourceSnapshot {
            timestamp: 0,
            cpu,
            memory: 50.0,
            storage: 50.0,
            network: 0.0,
            temperature: 50.0,
            uptime_epoch_ms: 1_000,
        }
    }

    #[test]
    fn cpu_moves_at_most_delta_per_tick() {
        let walk = WalkConfig::default();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let next = next_resources(&mut rng, &snapshot(45.0), &walk, 1);
            assert!(
                (35.0..=55.0).contains(&next.cpu),
                "seed {seed}: cpu {} outside [35, 55]",
                next.cpu
            );
        }
    }

    #[test]
    fn walk_near_edge_is_clamped() {
        let walk = WalkConfig::default();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let next = next_resources(&mut rng, &snapshot(98.0), &walk, 1);
            assert!((88.0..=100.0).contains(&next.cpu));
        }
    }

    #[test]
    fn out_of_range_previous_value_is_pulled_into_bounds() {
        let walk = WalkConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut prev = snapshot(0.0);
        prev.memory = 0.0;
        let next = next_resources(&mut rng, &prev, &walk, 1);
        assert!(next.memory >= 20.0);
    }

    #[test]
    fn temperature_and_network_are_redrawn_within_bounds() {
        let walk = WalkConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut prev = snapshot(10.0);
        for _ in 0..500 {
            let next = next_resources(&mut rng, &prev, &walk, 1);
            assert!((45.0..=65.0).contains(&next.temperature));
            assert!((0.0..=100.0).contains(&next.network));
            prev = next;
        }
    }

    #[test]
    fn boot_epoch_is_carried_over() {
        let walk = WalkConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let next = next_resources(&mut rng, &snapshot(45.0), &walk, 99);
        assert_eq!(next.uptime_epoch_ms, 1_000);
        assert_eq!(next.timestamp, 99);
    }

    #[test]
    fn zero_delta_keeps_value() {
        let mut rng = StdRng::seed_from_u64(1);
        let v = random_walk(&mut rng, 42.0, 0.0, FieldBounds::new(0.0, 100.0));
        assert_eq!(v, 42.0);
    }

    #[test]
    fn processes_never_go_negative() {
        let walk = WalkConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut procs = vec![ProcessInfo::running(1, "init", 0.0, 0.0)];
        for _ in 0..1000 {
            advance_processes(&mut rng, &mut procs, &walk);
            assert!(procs[0].cpu_percent >= 0.0);
            assert!(procs[0].memory_percent >= 0.0);
        }
    }
}
