use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// Engine-reported container state. `NotFound` is the sentinel used when no
/// container exists for a profile.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ContainerState {
    NotFound,
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Other(String),
}

impl ContainerState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            "not_found" | "" => ContainerState::NotFound,
            other => ContainerState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContainerState::NotFound => "not_found",
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Other(raw) => raw,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContainerState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub state: ContainerState,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VolumeMount {
    pub host: PathBuf,
    pub container: String,
    pub read_only: bool,
}

impl VolumeMount {
    pub fn rw(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            read_only: false,
        }
    }

    pub fn ro(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            read_only: true,
            ..Self::rw(host, container)
        }
    }
}

/// Everything needed to instantiate one detached container.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RunSpec {
    pub image: String,
    pub name: String,
    pub ipc_mode: Option<String>,
    pub capabilities: Vec<String>,
    pub security_opts: Vec<String>,
    pub volumes: Vec<VolumeMount>,
    pub env: BTreeMap<String, String>,
    pub devices: Vec<String>,
    pub groups: Vec<String>,
    pub dns_servers: Vec<String>,
    pub dns_options: Vec<String>,
    pub args: Vec<String>,
}
