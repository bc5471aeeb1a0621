use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A project: the namespace services live in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The `projects` half of `projects.listProjectsAndServices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsPayload {
    pub projects: Vec<Project>,
}
