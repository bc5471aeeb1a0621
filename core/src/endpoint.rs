//! The catalog of remote procedures.
//!
//! Each `Endpoint` is a `const` descriptor: method, path, the parameters the
//! procedure takes (in wire order) and whether a successful response carries
//! a payload worth decoding. Queries are GETs whose parameters travel in the
//! `input` query string; mutations are POSTs with a `{"json": …}` body.

use std::fmt;

use crate::http::HttpMethod;

/// Common prefix of every procedure path.
pub const TRPC_PREFIX: &str = "/api/trpc/";

/// Descriptor of one remote procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
    /// Required parameters, in the order they are serialized.
    pub params: &'static [&'static str],
    /// Whether the response payload is decoded (queries) or ignored
    /// beyond its status (mutations).
    pub returns_payload: bool,
}

impl Endpoint {
    const fn query(path: &'static str, params: &'static [&'static str]) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
            params,
            returns_payload: true,
        }
    }

    const fn mutation(path: &'static str, params: &'static [&'static str]) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
            params,
            returns_payload: false,
        }
    }

    /// The procedure name, e.g. `services.app.deployService`.
    pub fn procedure(&self) -> &'static str {
        self.path.strip_prefix(TRPC_PREFIX).unwrap_or(self.path)
    }

    pub const fn is_query(&self) -> bool {
        matches!(self.method, HttpMethod::Get)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

const SERVICE_REF: &[&str] = &["projectName", "serviceName"];

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Serves both the project list and the service list.
pub const LIST_PROJECTS_AND_SERVICES: Endpoint =
    Endpoint::query("/api/trpc/projects.listProjectsAndServices", &[]);
pub const INSPECT_SERVICE: Endpoint =
    Endpoint::query("/api/trpc/projects.inspectService", SERVICE_REF);
pub const INSPECT_PROJECT: Endpoint =
    Endpoint::query("/api/trpc/projects.inspectProject", &["projectName"]);
pub const GET_USER: Endpoint = Endpoint::query("/api/trpc/auth.getUser", &[]);
pub const GET_SYSTEM_STATS: Endpoint = Endpoint::query("/api/trpc/monitor.getSystemStats", &[]);

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

pub const CREATE_APP_SERVICE: Endpoint =
    Endpoint::mutation("/api/trpc/services.app.createService", SERVICE_REF);
pub const SET_SERVICE_NOTES: Endpoint = Endpoint::mutation(
    "/api/trpc/services.common.setName",
    &["projectName", "serviceName", "notes"],
);
pub const ENABLE_GITHUB_DEPLOY: Endpoint =
    Endpoint::mutation("/api/trpc/services.app.enableGithubDeploy", SERVICE_REF);
pub const DISABLE_GITHUB_DEPLOY: Endpoint =
    Endpoint::mutation("/api/trpc/services.app.disableGithubDeploy", SERVICE_REF);
pub const REFRESH_DEPLOY_TOKEN: Endpoint =
    Endpoint::mutation("/api/trpc/services.app.refreshDeployToken", SERVICE_REF);
pub const CREATE_USER: Endpoint =
    Endpoint::mutation("/api/trpc/users.createUser", &["email", "password", "admin"]);

/// Service flavours that expose lifecycle procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    App,
    Compose,
}

impl ServiceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceKind::App => "app",
            ServiceKind::Compose => "compose",
        }
    }
}

/// Lifecycle procedures shared by app and compose services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceAction {
    Deploy,
    Start,
    Stop,
    Destroy,
}

impl ServiceAction {
    pub const ALL: [ServiceAction; 4] = [
        ServiceAction::Deploy,
        ServiceAction::Start,
        ServiceAction::Stop,
        ServiceAction::Destroy,
    ];
}

/// The lifecycle endpoint for `action` on a service of `kind`.
pub const fn service_action(kind: ServiceKind, action: ServiceAction) -> Endpoint {
    let path = match (kind, action) {
        (ServiceKind::App, ServiceAction::Deploy) => "/api/trpc/services.app.deployService",
        (ServiceKind::App, ServiceAction::Start) => "/api/trpc/services.app.startService",
        (ServiceKind::App, ServiceAction::Stop) => "/api/trpc/services.app.stopService",
        (ServiceKind::App, ServiceAction::Destroy) => "/api/trpc/services.app.destroyService",
        (ServiceKind::Compose, ServiceAction::Deploy) => "/api/trpc/services.compose.deployService",
        (ServiceKind::Compose, ServiceAction::Start) => "/api/trpc/services.compose.startService",
        (ServiceKind::Compose, ServiceAction::Stop) => "/api/trpc/services.compose.stopService",
        (ServiceKind::Compose, ServiceAction::Destroy) => {
            "/api/trpc/services.compose.destroyService"
        }
    };
    Endpoint::mutation(path, SERVICE_REF)
}
