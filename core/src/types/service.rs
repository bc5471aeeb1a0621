use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::commit::Commit;

/// A service inside a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    pub project_name: String,
    pub name: String,
    /// `app`, `compose`, `mysql`, `wordpress`, ...
    #[serde(rename = "type")]
    pub service_type: String,
    pub enabled: bool,
    /// Deploy webhook token.
    pub token: String,
    /// Undocumented; passed through as received.
    pub primary_domain_id: Value,
    pub env: String,
    pub deploy: Option<ServiceDeploy>,
    pub mounts: Vec<Value>,
    pub ports: Vec<Value>,
    pub source: Option<ServiceSource>,
    pub build: Option<ServiceBuild>,
    /// Undocumented; passed through as received.
    pub create_dot_env: Value,
    pub commit: Option<Commit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceDeploy {
    pub replicas: u32,
    pub command: Value,
    pub zero_downtime: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub path: String,
    pub auto_deploy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceBuild {
    #[serde(rename = "type")]
    pub build_type: String,
    pub nixpacks_version: String,
}

/// The `services` half of `projects.listProjectsAndServices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesPayload {
    pub services: Vec<Service>,
}
