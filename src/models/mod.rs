// Domain models served to dashboards (JSON camelCase)

mod entity;
mod network;
mod process;
mod resource;
mod storage;

pub use entity::{
    EntityAction, EntityKind, EntityMetadata, EntityStatus, ManagedEntity, ResourceLimits,
    ResourceUsage, StatusCounts, UnknownAction,
};
pub use network::{ConnectionState, NetworkInterface};
pub use process::{ProcessInfo, ProcessState};
pub use resource::{FieldBounds, ResourceSnapshot, ResourceView};
pub use storage::{DeviceHealth, DeviceKind, StorageDevice, StorageReport, StorageSummary};
