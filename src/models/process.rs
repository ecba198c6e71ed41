// Simulated process table

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Running,
    Sleeping,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub state: ProcessState,
}

impl ProcessInfo {
    pub fn running(pid: u32, name: &str, cpu_percent: f64, memory_percent: f64) -> Self {
        Self {
            pid,
            name: name.to_string(),
            cpu_percent,
            memory_percent,
            state: ProcessState::Running,
        }
    }
}
