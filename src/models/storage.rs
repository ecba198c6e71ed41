// Storage inventory models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Ssd,
    Hdd,
    Nvme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceHealth {
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDevice {
    pub name: String,
    pub mount_point: String,
    pub size_gb: u64,
    pub used_gb: u64,
    pub available_gb: u64,
    pub kind: DeviceKind,
    pub health: DeviceHealth,
}

impl StorageDevice {
    pub fn usage_percent(&self) -> f64 {
        if self.size_gb == 0 {
            return 0.0;
        }
        self.used_gb as f64 / self.size_gb as f64 * 100.0
    }
}

/// Totals across all devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSummary {
    pub total_gb: u64,
    pub used_gb: u64,
    pub available_gb: u64,
    pub usage_percent: f64,
}

impl StorageSummary {
    pub fn from_devices(devices: &[StorageDevice]) -> Self {
        let total_gb: u64 = devices.iter().map(|d| d.size_gb).sum();
        let used_gb: u64 = devices.iter().map(|d| d.used_gb).sum();
        let available_gb: u64 = devices.iter().map(|d| d.available_gb).sum();
        let usage_percent = if total_gb > 0 {
            used_gb as f64 / total_gb as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_gb,
            used_gb,
            available_gb,
            usage_percent,
        }
    }
}

/// Devices plus totals, as served by GET /api/storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReport {
    pub devices: Vec<StorageDevice>,
    pub summary: StorageSummary,
}
