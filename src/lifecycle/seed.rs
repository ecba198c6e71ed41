// Entities registered at startup: the host's services and containers.

use crate::models::{
    EntityKind, EntityMetadata, EntityStatus, ManagedEntity, ResourceLimits, ResourceUsage,
};

const SERVICE_LIMITS: ResourceLimits = ResourceLimits {
    cpu_ceiling_percent: 5.0,
    memory_floor_mb: 20.0,
    memory_ceiling_mb: 120.0,
};

const CONTAINER_CPU_CEILING: f64 = 20.0;

struct ServiceSeed {
    id: &'static str,
    name: &'static str,
    status: EntityStatus,
    description: &'static str,
    port: Option<u16>,
    memory_mb: f64,
    cpu_percent: f64,
    auto_start: bool,
    last_restart: &'static str,
}

struct ContainerSeed {
    id: &'static str,
    name: &'static str,
    image: &'static str,
    status: EntityStatus,
    cpu_percent: f64,
    memory_mb: f64,
    memory_limit_mb: f64,
    ports: &'static [&'static str],
    created: &'static str,
}

const SERVICES: &[ServiceSeed] = &[
    ServiceSeed {
        id: "nginx",
        name: "Nginx Web Server",
        status: EntityStatus::Running,
        description: "High-performance web server and reverse proxy",
        port: Some(80),
        memory_mb: 45.2,
        cpu_percent: 1.2,
        auto_start: true,
        last_restart: "2024-01-15 10:30:45",
    },
    ServiceSeed {
        id: "postgres",
        name: "PostgreSQL Database",
        status: EntityStatus::Running,
        description: "Advanced open source relational database",
        port: Some(5432),
        memory_mb: 128.5,
        cpu_percent: 2.1,
        auto_start: true,
        last_restart: "2024-01-15 10:30:42",
    },
    ServiceSeed {
        id: "redis",
        name: "Redis Cache",
        status: EntityStatus::Running,
        description: "In-memory data structure store",
        port: Some(6379),
        memory_mb: 32.1,
        cpu_percent: 0.8,
        auto_start: true,
        last_restart: "2024-01-15 10:30:48",
    },
    ServiceSeed {
        id: "nodejs",
        name: "Node.js Application",
        status: EntityStatus::Stopped,
        description: "JavaScript runtime for server-side applications",
        port: Some(3000),
        memory_mb: 0.0,
        cpu_percent: 0.0,
        auto_start: false,
        last_restart: "2024-01-14 15:22:10",
    },
    ServiceSeed {
        id: "docker",
        name: "Docker Engine",
        status: EntityStatus::Running,
        description: "Container runtime and orchestration",
        port: None,
        memory_mb: 256.7,
        cpu_percent: 3.4,
        auto_start: true,
        last_restart: "2024-01-15 10:30:35",
    },
    ServiceSeed {
        id: "filebrowser",
        name: "File Browser",
        status: EntityStatus::Error,
        description: "Web-based file management interface",
        port: Some(8080),
        memory_mb: 0.0,
        cpu_percent: 0.0,
        auto_start: false,
        last_restart: "2024-01-14 12:45:33",
    },
];

const CONTAINERS: &[ContainerSeed] = &[
    ContainerSeed {
        id: "webapp_1",
        name: "nexus-webapp",
        image: "node:18-alpine",
        status: EntityStatus::Running,
        cpu_percent: 15.4,
        memory_mb: 128.0,
        memory_limit_mb: 512.0,
        ports: &["3000:3000"],
        created: "2024-01-15 10:30:45",
    },
    ContainerSeed {
        id: "db_1",
        name: "nexus-database",
        image: "postgres:15",
        status: EntityStatus::Running,
        cpu_percent: 8.2,
        memory_mb: 256.0,
        memory_limit_mb: 1024.0,
        ports: &["5432:5432"],
        created: "2024-01-15 10:30:42",
    },
    ContainerSeed {
        id: "cache_1",
        name: "nexus-redis",
        image: "redis:7-alpine",
        status: EntityStatus::Running,
        cpu_percent: 2.1,
        memory_mb: 32.0,
        memory_limit_mb: 128.0,
        ports: &["6379:6379"],
        created: "2024-01-15 10:30:48",
    },
    ContainerSeed {
        id: "nginx_1",
        name: "nexus-proxy",
        image: "nginx:alpine",
        status: EntityStatus::Running,
        cpu_percent: 1.8,
        memory_mb: 16.0,
        memory_limit_mb: 64.0,
        ports: &["80:80", "443:443"],
        created: "2024-01-15 10:30:35",
    },
    ContainerSeed {
        id: "monitor_1",
        name: "nexus-monitoring",
        image: "grafana/grafana:latest",
        status: EntityStatus::Stopped,
        cpu_percent: 0.0,
        memory_mb: 0.0,
        memory_limit_mb: 256.0,
        ports: &["3001:3000"],
        created: "2024-01-14 15:22:10",
    },
    ContainerSeed {
        id: "backup_1",
        name: "nexus-backup",
        image: "postgres:15",
        status: EntityStatus::Paused,
        cpu_percent: 0.0,
        memory_mb: 64.0,
        memory_limit_mb: 128.0,
        ports: &[],
        created: "2024-01-13 09:15:30",
    },
];

/// Running containers use 10-50% of their memory limit.
pub fn container_limits(memory_limit_mb: f64) -> ResourceLimits {
    ResourceLimits {
        cpu_ceiling_percent: CONTAINER_CPU_CEILING,
        memory_floor_mb: memory_limit_mb * 0.1,
        memory_ceiling_mb: memory_limit_mb * 0.5,
    }
}

pub fn default_services() -> Vec<ManagedEntity> {
    SERVICES
        .iter()
        .map(|s| ManagedEntity {
            id: s.id.to_string(),
            kind: EntityKind::Service,
            display_name: s.name.to_string(),
            status: s.status,
            resource_usage: ResourceUsage {
                cpu_percent: s.cpu_percent,
                memory_mb: s.memory_mb,
            },
            limits: SERVICE_LIMITS,
            metadata: EntityMetadata {
                description: Some(s.description.to_string()),
                image: None,
                ports: s.port.map(|p| p.to_string()).into_iter().collect(),
                auto_start: s.auto_start,
                created_at: None,
                last_transition_at: s.last_restart.to_string(),
            },
        })
        .collect()
}

pub fn default_containers() -> Vec<ManagedEntity> {
    CONTAINERS
        .iter()
        .map(|c| ManagedEntity {
            id: c.id.to_string(),
            kind: EntityKind::Container,
            display_name: c.name.to_string(),
            status: c.status,
            resource_usage: ResourceUsage {
                cpu_percent: c.cpu_percent,
                memory_mb: c.memory_mb,
            },
            limits: container_limits(c.memory_limit_mb),
            metadata: EntityMetadata {
                description: None,
                image: Some(c.image.to_string()),
                ports: c.ports.iter().map(|p| p.to_string()).collect(),
                auto_start: false,
                created_at: Some(c.created.to_string()),
                last_transition_at: c.created.to_string(),
            },
        })
        .collect()
}

/// Services followed by containers.
pub fn default_entities() -> Vec<ManagedEntity> {
    let mut entities = default_services();
    entities.extend(default_containers());
    entities
}
