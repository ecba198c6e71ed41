// Entity lifecycle simulator: registry of services/containers and simulated,
// asynchronously-resolving lifecycle commands.
//
// Policy for overlapping commands: a new command on an entity supersedes its pending
// one. The previous resolution task is aborted and, in case it already woke up, its
// op id no longer matches the entity's pending slot, so at most one resolution applies.

mod error;
mod seed;
pub mod transitions;

pub use error::{CommandError, CommandResult};
pub use seed::{container_limits, default_containers, default_entities, default_services};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Duration;

use crate::clock::local_timestamp;
use crate::config::LifecycleConfig;
use crate::models::{
    EntityAction, EntityKind, EntityStatus, ManagedEntity, ResourceLimits, ResourceUsage,
    StatusCounts,
};
use crate::notify::{Notifier, Subscription, SubscriptionHandle};

/// Returned immediately by [`LifecycleSimulator::issue_command`]; the outcome arrives later
/// as a [`LifecycleEvent::CommandCompleted`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandTicket {
    pub entity_id: String,
    pub action: EntityAction,
    pub op_id: u64,
    pub interim_status: Option<EntityStatus>,
    pub target_status: EntityStatus,
    pub resolves_in_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    /// A newer command on the same entity replaced this one.
    Superseded,
    /// The simulator was disposed before the command resolved.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub entity_id: String,
    pub action: EntityAction,
    pub op_id: u64,
    pub success: bool,
    /// Entity status after the outcome was applied.
    pub status: EntityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LifecycleEvent {
    /// Any status or usage change of one entity.
    EntityChanged { entity: ManagedEntity },
    CommandCompleted(CommandOutcome),
}

/// An entity plus the command state a dashboard needs to enable its actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetail {
    #[serde(flatten)]
    pub entity: ManagedEntity,
    /// Status the in-flight command resolves to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_target: Option<EntityStatus>,
    pub allowed_actions: Vec<EntityAction>,
}

/// Optional kind and free-text query for [`LifecycleSimulator::list_entities`].
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    pub kind: Option<EntityKind>,
    pub query: Option<String>,
}

impl EntityFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

struct PendingOp {
    op_id: u64,
    action: EntityAction,
    /// Status before the command was issued; restored if the command is cancelled.
    from: EntityStatus,
    target: EntityStatus,
    handle: tokio::task::JoinHandle<()>,
}

struct Entry {
    entity: ManagedEntity,
    pending: Option<PendingOp>,
}

struct Registry {
    entries: Vec<Entry>,
    next_op_id: u64,
    disposed: bool,
    rng: StdRng,
}

impl Registry {
    fn entry_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.entity.id == id)
    }
}

/// Process-wide store of managed entities. Cheap to share behind an `Arc`.
pub struct LifecycleSimulator {
    registry: Arc<Mutex<Registry>>,
    notifier: Arc<Notifier<LifecycleEvent>>,
    service_latency: Duration,
    container_latency: Duration,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl LifecycleSimulator {
    /// Registry of the default services and containers.
    pub fn with_default_seed(config: &LifecycleConfig) -> Self {
        Self::new(default_entities(), config)
    }

    pub fn new(seed: Vec<ManagedEntity>, config: &LifecycleConfig) -> Self {
        Self::with_rng(seed, config, StdRng::from_entropy())
    }

    /// Duplicate ids in `seed` are dropped (first one wins).
    pub fn with_rng(seed: Vec<ManagedEntity>, config: &LifecycleConfig, rng: StdRng) -> Self {
        let mut seen = HashSet::new();
        let entries = seed
            .into_iter()
            .filter(|e| {
                let fresh = seen.insert(e.id.clone());
                if !fresh {
                    tracing::warn!(entity_id = %e.id, "duplicate entity id in seed; skipped");
                }
                fresh
            })
            .map(|entity| Entry {
                entity,
                pending: None,
            })
            .collect();
        Self {
            registry: Arc::new(Mutex::new(Registry {
                entries,
                next_op_id: 1,
                disposed: false,
                rng,
            })),
            notifier: Arc::new(Notifier::new("lifecycle", config.event_capacity)),
            service_latency: Duration::from_millis(config.service_latency_ms),
            container_latency: Duration::from_millis(config.container_latency_ms),
        }
    }

    pub fn latency_for(&self, kind: EntityKind) -> Duration {
        match kind {
            EntityKind::Service => self.service_latency,
            EntityKind::Container => self.container_latency,
        }
    }

    /// Validates `action` against the transition table, applies its interim status right
    /// away and schedules the resolution. Returns without waiting for it.
    /// Must be called inside a Tokio runtime.
    pub fn issue_command(
        &self,
        entity_id: &str,
        action: EntityAction,
    ) -> CommandResult<CommandTicket> {
        let mut guard = lock(&self.registry);
        let reg = &mut *guard;
        if reg.disposed {
            return Err(CommandError::Disposed);
        }
        let op_id = reg.next_op_id;
        let Some(entry) = reg.entry_mut(entity_id) else {
            tracing::debug!(entity_id, %action, "command for unknown entity");
            return Err(CommandError::EntityNotFound {
                id: entity_id.to_string(),
            });
        };

        let effective = entry
            .pending
            .as_ref()
            .map(|p| p.target)
            .unwrap_or(entry.entity.status);
        let Some(transition) = transitions::plan(effective, action) else {
            tracing::debug!(entity_id, %action, status = %effective, "invalid transition");
            return Err(CommandError::InvalidTransition {
                id: entity_id.to_string(),
                status: effective,
                action,
            });
        };

        let superseded = entry.pending.take();
        let mut from = entry.entity.status;
        if let Some(prev) = superseded.as_ref() {
            prev.handle.abort();
            from = prev.from;
            tracing::debug!(
                entity_id,
                superseded_op = prev.op_id,
                superseded_action = %prev.action,
                "pending command superseded"
            );
        }

        if let Some(interim) = transition.interim {
            entry.entity.status = interim;
            self.notifier.publish(LifecycleEvent::EntityChanged {
                entity: entry.entity.clone(),
            });
        }
        if let Some(prev) = superseded {
            self.notifier
                .publish(LifecycleEvent::CommandCompleted(CommandOutcome {
                    entity_id: entity_id.to_string(),
                    action: prev.action,
                    op_id: prev.op_id,
                    success: false,
                    status: entry.entity.status,
                    reason: Some(FailureReason::Superseded),
                }));
        }

        let latency = self.latency_for(entry.entity.kind);
        let handle = tokio::spawn(resolve_after(
            self.registry.clone(),
            self.notifier.clone(),
            entity_id.to_string(),
            op_id,
            latency,
        ));
        entry.pending = Some(PendingOp {
            op_id,
            action,
            from,
            target: transition.target,
            handle,
        });
        reg.next_op_id += 1;

        tracing::info!(
            entity_id,
            %action,
            op_id,
            target = %transition.target,
            "command accepted"
        );
        Ok(CommandTicket {
            entity_id: entity_id.to_string(),
            action,
            op_id,
            interim_status: transition.interim,
            target_status: transition.target,
            resolves_in_ms: latency.as_millis() as u64,
        })
    }

    /// The entity together with what `issue_command` would accept for it right now.
    pub fn entity_detail(&self, entity_id: &str) -> Option<EntityDetail> {
        let reg = lock(&self.registry);
        let entry = reg.entries.iter().find(|e| e.entity.id == entity_id)?;
        let pending_target = entry.pending.as_ref().map(|p| p.target);
        Some(EntityDetail {
            entity: entry.entity.clone(),
            pending_target,
            allowed_actions: transitions::allowed_actions(
                pending_target.unwrap_or(entry.entity.status),
            ),
        })
    }

    /// Actions valid against the effective status (pending target, else current status).
    pub fn allowed_actions(&self, entity_id: &str) -> Option<Vec<EntityAction>> {
        self.entity_detail(entity_id).map(|d| d.allowed_actions)
    }

    pub fn get_entity(&self, entity_id: &str) -> Option<ManagedEntity> {
        lock(&self.registry)
            .entries
            .iter()
            .find(|e| e.entity.id == entity_id)
            .map(|e| e.entity.clone())
    }

    /// Entities in registration order. The query is a case-insensitive substring
    /// match over display name, description and image.
    pub fn list_entities(&self, filter: &EntityFilter) -> Vec<ManagedEntity> {
        let needle = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();
        lock(&self.registry)
            .entries
            .iter()
            .map(|e| &e.entity)
            .filter(|e| filter.kind.is_none_or(|k| e.kind == k))
            .filter(|e| e.matches_query(&needle))
            .cloned()
            .collect()
    }

    pub fn count_by_status(&self, kind: Option<EntityKind>) -> StatusCounts {
        lock(&self.registry)
            .entries
            .iter()
            .map(|e| &e.entity)
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .collect()
    }

    /// Number of commands issued but not yet resolved.
    pub fn pending_count(&self) -> usize {
        lock(&self.registry)
            .entries
            .iter()
            .filter(|e| e.pending.is_some())
            .count()
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.registry).disposed
    }

    /// Cancels every pending resolution (restoring the pre-command status) and rejects
    /// further commands. Idempotent.
    pub fn dispose(&self) {
        let mut guard = lock(&self.registry);
        if guard.disposed {
            return;
        }
        guard.disposed = true;
        let mut cancelled = 0usize;
        for entry in guard.entries.iter_mut() {
            let Some(pending) = entry.pending.take() else {
                continue;
            };
            pending.handle.abort();
            entry.entity.status = pending.from;
            cancelled += 1;
            self.notifier
                .publish(LifecycleEvent::CommandCompleted(CommandOutcome {
                    entity_id: entry.entity.id.clone(),
                    action: pending.action,
                    op_id: pending.op_id,
                    success: false,
                    status: entry.entity.status,
                    reason: Some(FailureReason::Cancelled),
                }));
        }
        tracing::info!(cancelled, "lifecycle simulator disposed");
    }

    pub fn subscribe(&self) -> Subscription<LifecycleEvent> {
        self.notifier.subscribe()
    }

    pub fn on_event<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: FnMut(LifecycleEvent) + Send + 'static,
    {
        self.notifier.on_event(callback)
    }
}

async fn resolve_after(
    registry: Arc<Mutex<Registry>>,
    notifier: Arc<Notifier<LifecycleEvent>>,
    entity_id: String,
    op_id: u64,
    latency: Duration,
) {
    tokio::time::sleep(latency).await;
    resolve(&registry, &notifier, &entity_id, op_id);
}

/// Applies the pending command `op_id` if it is still the entity's current one.
fn resolve(
    registry: &Mutex<Registry>,
    notifier: &Notifier<LifecycleEvent>,
    entity_id: &str,
    op_id: u64,
) {
    let mut guard = lock(registry);
    let reg = &mut *guard;
    if reg.disposed {
        return;
    }
    let Some(entry) = reg.entries.iter_mut().find(|e| e.entity.id == entity_id) else {
        return;
    };
    if entry.pending.as_ref().is_none_or(|p| p.op_id != op_id) {
        tracing::debug!(entity_id, op_id, "stale resolution ignored");
        return;
    }
    let Some(pending) = entry.pending.take() else {
        return;
    };

    let entity = &mut entry.entity;
    entity.status = pending.target;
    entity.resource_usage = usage_for_status(
        &mut reg.rng,
        pending.target,
        &entity.limits,
        entity.resource_usage,
    );
    entity.metadata.last_transition_at = local_timestamp();

    tracing::info!(
        entity_id,
        action = %pending.action,
        op_id,
        status = %entity.status,
        "command resolved"
    );
    notifier.publish(LifecycleEvent::EntityChanged {
        entity: entity.clone(),
    });
    notifier.publish(LifecycleEvent::CommandCompleted(CommandOutcome {
        entity_id: entity_id.to_string(),
        action: pending.action,
        op_id,
        success: true,
        status: entity.status,
        reason: None,
    }));
}

/// Usage after resolving to `status`: zero when stopped, memory kept (cpu zero) when
/// paused, fresh values under `limits` when running.
pub fn usage_for_status<R: Rng + ?Sized>(
    rng: &mut R,
    status: EntityStatus,
    limits: &ResourceLimits,
    previous: ResourceUsage,
) -> ResourceUsage {
    match status {
        EntityStatus::Running => {
            let ceiling = limits.cpu_ceiling_percent.max(0.01);
            let cpu_floor = (ceiling * 0.05).min(ceiling);
            let memory_mb = if limits.memory_floor_mb < limits.memory_ceiling_mb {
                rng.gen_range(limits.memory_floor_mb..=limits.memory_ceiling_mb)
            } else {
                limits.memory_ceiling_mb
            };
            ResourceUsage {
                cpu_percent: rng.gen_range(cpu_floor..=ceiling),
                memory_mb,
            }
        }
        EntityStatus::Paused => ResourceUsage {
            cpu_percent: 0.0,
            memory_mb: previous.memory_mb,
        },
        _ => ResourceUsage::IDLE,
    }
}
