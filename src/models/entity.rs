// Managed entity models (services and containers)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Service,
    Container,
}

/// Entity status; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Running,
    Stopped,
    Paused,
    Starting,
    Stopping,
    Restarting,
    Error,
}

impl EntityStatus {
    /// Interim statuses only exist while a command is in flight.
    pub fn is_transitional(self) -> bool {
        matches!(
            self,
            EntityStatus::Starting | EntityStatus::Stopping | EntityStatus::Restarting
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Running => "running",
            EntityStatus::Stopped => "stopped",
            EntityStatus::Paused => "paused",
            EntityStatus::Starting => "starting",
            EntityStatus::Stopping => "stopping",
            EntityStatus::Restarting => "restarting",
            EntityStatus::Error => "error",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityAction {
    Start,
    Stop,
    Restart,
    Pause,
    #[serde(alias = "resume")]
    Unpause,
}

impl EntityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityAction::Start => "start",
            EntityAction::Stop => "stop",
            EntityAction::Restart => "restart",
            EntityAction::Pause => "pause",
            EntityAction::Unpause => "unpause",
        }
    }
}

impl fmt::Display for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for EntityAction {
    type Err = UnknownAction;

    /// Case-insensitive; "resume" is accepted as an alias for "unpause".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(EntityAction::Start),
            "stop" => Ok(EntityAction::Stop),
            "restart" => Ok(EntityAction::Restart),
            "pause" => Ok(EntityAction::Pause),
            "unpause" | "resume" => Ok(EntityAction::Unpause),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

impl ResourceUsage {
    pub const IDLE: ResourceUsage = ResourceUsage {
        cpu_percent: 0.0,
        memory_mb: 0.0,
    };
}

/// Ceiling for randomized usage while running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimits {
    pub cpu_ceiling_percent: f64,
    pub memory_floor_mb: f64,
    pub memory_ceiling_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Local time of the last resolved command (or the seed value).
    pub last_transition_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedEntity {
    pub id: String,
    pub kind: EntityKind,
    pub display_name: String,
    pub status: EntityStatus,
    pub resource_usage: ResourceUsage,
    pub limits: ResourceLimits,
    pub metadata: EntityMetadata,
}

impl ManagedEntity {
    /// Case-insensitive substring match over display name, description and image.
    /// `needle` must already be lowercased.
    pub fn matches_query(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(needle);
        hit(&self.display_name)
            || self.metadata.description.as_deref().is_some_and(hit)
            || self.metadata.image.as_deref().is_some_and(hit)
    }
}

/// Entity count per status; statuses with no entities are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub by_status: BTreeMap<EntityStatus, usize>,
}

impl StatusCounts {
    pub fn get(&self, status: EntityStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

impl<'a> FromIterator<&'a ManagedEntity> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a ManagedEntity>>(iter: I) -> Self {
        let mut counts = StatusCounts::default();
        for entity in iter {
            counts.total += 1;
            *counts.by_status.entry(entity.status).or_insert(0) += 1;
        }
        counts
    }
}
