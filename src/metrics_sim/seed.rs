// Fixed host inventory the metrics simulator starts from.

use crate::config::WalkConfig;
use crate::models::{
    DeviceHealth, DeviceKind, NetworkInterface, ProcessInfo, ResourceSnapshot, StorageDevice,
};

/// Simulated time since boot at startup.
const SIMULATED_UPTIME_MS: u64 = 15 * 24 * 60 * 60 * 1000;

/// Everything a metrics simulator starts from.
#[derive(Debug, Clone)]
pub struct MetricsSeed {
    pub resources: ResourceSnapshot,
    pub interfaces: Vec<NetworkInterface>,
    pub processes: Vec<ProcessInfo>,
    pub storage: Vec<StorageDevice>,
}

impl MetricsSeed {
    /// Resources at each field's minimum, boot epoch 15 days before `now_ms`.
    pub fn default_host(walk: &WalkConfig, now_ms: u64) -> Self {
        Self {
            resources: ResourceSnapshot {
                timestamp: now_ms,
                cpu: walk.cpu.min,
                memory: walk.memory.min,
                storage: walk.storage.min,
                network: walk.network.min,
                temperature: walk.temperature.min,
                uptime_epoch_ms: now_ms.saturating_sub(SIMULATED_UPTIME_MS),
            },
            interfaces: default_interfaces(),
            processes: default_processes(),
            storage: default_storage(),
        }
    }
}

pub fn default_interfaces() -> Vec<NetworkInterface> {
    vec![
        NetworkInterface::new("eth0", "192.168.1.100", 1000),
        NetworkInterface::new("wlan0", "192.168.1.101", 300),
    ]
}

pub fn default_processes() -> Vec<ProcessInfo> {
    vec![
        ProcessInfo::running(1, "systemd", 0.1, 2.3),
        ProcessInfo::running(1234, "nginx", 1.2, 5.6),
        ProcessInfo::running(1235, "postgres", 2.1, 15.4),
        ProcessInfo::running(1236, "redis-server", 0.8, 3.2),
        ProcessInfo::running(1237, "node", 5.4, 12.8),
    ]
}

pub fn default_storage() -> Vec<StorageDevice> {
    let device = |name: &str,
                  mount: &str,
                  size: u64,
                  used: u64,
                  kind: DeviceKind,
                  health: DeviceHealth| StorageDevice {
        name: name.to_string(),
        mount_point: mount.to_string(),
        size_gb: size,
        used_gb: used,
        available_gb: size - used,
        kind,
        health,
    };
    vec![
        device("/dev/sda1", "/", 500, 320, DeviceKind::Ssd, DeviceHealth::Good),
        device("/dev/sdb1", "/home", 1000, 450, DeviceKind::Hdd, DeviceHealth::Good),
        device("/dev/nvme0n1", "/var", 250, 180, DeviceKind::Nvme, DeviceHealth::Warning),
    ]
}
