//! Domain DTOs for the Easypanel API.
//!
//! # Design
//! Response records mirror the control plane's resource shapes and carry no
//! behavior. Every struct is `#[serde(default)]`: a field missing from the
//! payload (or sent as null) becomes its zero value instead of failing the
//! decode. Fields whose meaning the API does not document stay opaque
//! `serde_json::Value`s.
//!
//! Request-side option structs live in `request` and know how to turn
//! themselves into sparse field groups.

mod commit;
mod project;
mod request;
mod service;
mod stats;
mod timestamp;
mod user;

pub use commit::{Commit, CommitDetails, CommitParent, CommitTree, CommitVerification, GitActor};
pub use project::{Project, ProjectsPayload};
pub use request::{
    BasicAuth, CreateBuild, CreateServiceOptions, CreateSource, DeployOptions, DeployServiceOptions,
    Maintenance, NewUser, ResourceLimits,
};
pub use service::{Service, ServiceBuild, ServiceDeploy, ServiceSource, ServicesPayload};
pub use stats::{CpuInfo, DiskInfo, MemInfo, NetworkInfo, SystemStats};
pub use user::User;
