use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Timestamp given to everything the server seeds or creates.
pub const SEED_TIME: &str = "2024-01-01T00:00:00Z";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub project_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub enabled: bool,
    pub token: String,
    pub env: String,
    pub notes: String,
    /// Completed deploy calls.
    pub deployments: u32,
    pub source: Source,
    pub deploy: Deploy,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: String,
    pub image: String,
    pub auto_deploy: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deploy {
    pub replicas: u32,
    pub command: Option<String>,
    pub zero_downtime: bool,
}

impl Default for Deploy {
    fn default() -> Self {
        Self {
            replicas: 1,
            command: None,
            zero_downtime: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub created_at: String,
    pub email: String,
    pub admin: bool,
    #[serde(skip_serializing)]
    pub password: String,
    pub api_token: String,
}

/// Everything the panel knows about.
#[derive(Debug, Default)]
pub struct PanelState {
    pub projects: Vec<Project>,
    pub services: Vec<Service>,
    pub users: Vec<User>,
}

impl PanelState {
    /// One project `demo` holding an app service `web` and a compose service
    /// `stack`, plus an admin user.
    pub fn seeded() -> Self {
        let service = |name: &str, service_type: &str| Service {
            project_name: "demo".to_string(),
            name: name.to_string(),
            service_type: service_type.to_string(),
            enabled: true,
            token: Uuid::new_v4().to_string(),
            env: String::new(),
            notes: String::new(),
            deployments: 0,
            source: Source {
                source_type: "image".to_string(),
                image: "nginx:latest".to_string(),
                auto_deploy: false,
            },
            deploy: Deploy::default(),
        };
        Self {
            projects: vec![Project {
                name: "demo".to_string(),
                created_at: SEED_TIME.to_string(),
            }],
            services: vec![service("web", "app"), service("stack", "compose")],
            users: vec![User {
                id: Uuid::new_v4().to_string(),
                created_at: SEED_TIME.to_string(),
                email: "admin@example.com".to_string(),
                admin: true,
                password: String::new(),
                api_token: Uuid::new_v4().to_string(),
            }],
        }
    }

    fn project(&self, name: &str) -> Result<&Project, Rejection> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| not_found(format!("project {name} not found")))
    }

    /// `kind` restricts the match to one service type.
    fn service_mut(
        &mut self,
        kind: Option<&str>,
        target: &ServiceRef,
    ) -> Result<&mut Service, Rejection> {
        self.services
            .iter_mut()
            .find(|s| {
                s.project_name == target.project_name
                    && s.name == target.service_name
                    && kind.map_or(true, |kind| s.service_type == kind)
            })
            .ok_or_else(|| {
                not_found(format!(
                    "service {}/{} not found",
                    target.project_name, target.service_name
                ))
            })
    }
}

pub type Db = Arc<RwLock<PanelState>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    auth_token: Option<Arc<str>>,
}

type Rejection = (StatusCode, String);

fn not_found(message: String) -> Rejection {
    (StatusCode::NOT_FOUND, message)
}

fn bad_request(message: String) -> Rejection {
    (StatusCode::BAD_REQUEST, message)
}

/// Router over freshly seeded state that accepts any caller.
pub fn app() -> Router {
    router(Arc::new(RwLock::new(PanelState::seeded())), None)
}

/// When `auth_token` is set, requests whose `authorization` header is not
/// exactly that value get 401.
pub fn router(db: Db, auth_token: Option<String>) -> Router {
    let state = AppState {
        db,
        auth_token: auth_token.map(Arc::from),
    };
    Router::new()
        .route("/api/trpc/{procedure}", get(query).post(mutation))
        .with_state(state)
}

pub async fn run(listener: TcpListener, auth_token: Option<String>) -> Result<(), std::io::Error> {
    let db = Arc::new(RwLock::new(PanelState::seeded()));
    axum::serve(listener, router(db, auth_token)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Rejection> {
    let Some(expected) = state.auth_token.as_deref() else {
        return Ok(());
    };
    let supplied = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if supplied == Some(expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "unauthorized".to_string()))
    }
}

fn envelope(payload: Value) -> Json<Value> {
    Json(json!({ "result": { "data": { "json": payload } } }))
}

/// The `{"json": ...}` wrapper around every input.
#[derive(Debug, Default, Deserialize)]
struct Input {
    #[serde(default)]
    json: Value,
}

impl Input {
    fn from_query(params: &HashMap<String, String>) -> Result<Self, Rejection> {
        match params.get("input") {
            Some(raw) => {
                serde_json::from_str(raw).map_err(|e| bad_request(format!("invalid input: {e}")))
            }
            None => Ok(Self::default()),
        }
    }

    fn parse<T: DeserializeOwned>(self) -> Result<T, Rejection> {
        serde_json::from_value(self.json).map_err(|e| bad_request(format!("invalid input: {e}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceRef {
    project_name: String,
    service_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRef {
    project_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateService {
    project_name: String,
    service_name: String,
    #[serde(default)]
    env: Option<String>,
    #[serde(default)]
    source: Option<Source>,
    #[serde(default)]
    deploy: Option<Deploy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployInput {
    #[serde(flatten)]
    target: ServiceRef,
    #[serde(default)]
    force_rebuild: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetNotes {
    #[serde(flatten)]
    target: ServiceRef,
    notes: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    email: String,
    password: String,
    #[serde(default)]
    admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Deploy,
    Start,
    Stop,
    Destroy,
}

/// Split `services.<kind>.<action>Service` for the kinds with lifecycle
/// procedures.
fn lifecycle(procedure: &str) -> Option<(&str, Lifecycle)> {
    let (kind, action) = procedure.strip_prefix("services.")?.split_once('.')?;
    if !matches!(kind, "app" | "compose") {
        return None;
    }
    let action = match action {
        "deployService" => Lifecycle::Deploy,
        "startService" => Lifecycle::Start,
        "stopService" => Lifecycle::Stop,
        "destroyService" => Lifecycle::Destroy,
        _ => return None,
    };
    Some((kind, action))
}

async fn query(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Rejection> {
    authorize(&state, &headers)?;
    let input = Input::from_query(&params)?;
    let db = state.db.read().await;
    let payload = match procedure.as_str() {
        "projects.listProjectsAndServices" => {
            json!({ "projects": db.projects, "services": db.services })
        }
        "projects.inspectProject" => {
            let target: ProjectRef = input.parse()?;
            json!(db.project(&target.project_name)?)
        }
        "projects.inspectService" => {
            let target: ServiceRef = input.parse()?;
            let service = db
                .services
                .iter()
                .find(|s| s.project_name == target.project_name && s.name == target.service_name)
                .ok_or_else(|| {
                    not_found(format!(
                        "service {}/{} not found",
                        target.project_name, target.service_name
                    ))
                })?;
            json!(service)
        }
        "auth.getUser" => {
            let user = db
                .users
                .first()
                .ok_or_else(|| (StatusCode::UNAUTHORIZED, "no user".to_string()))?;
            json!(user)
        }
        "monitor.getSystemStats" => system_stats(db.services.iter().filter(|s| s.enabled).count()),
        other => return Err(not_found(format!("no query procedure {other}"))),
    };
    Ok(envelope(payload))
}

async fn mutation(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Input>,
) -> Result<Json<Value>, Rejection> {
    authorize(&state, &headers)?;
    let mut db = state.db.write().await;
    match procedure.as_str() {
        "services.app.createService" => {
            let input: CreateService = input.parse()?;
            db.project(&input.project_name)?;
            if db
                .services
                .iter()
                .any(|s| s.project_name == input.project_name && s.name == input.service_name)
            {
                return Err((
                    StatusCode::CONFLICT,
                    format!("service {}/{} already exists", input.project_name, input.service_name),
                ));
            }
            tracing::info!(
                project = %input.project_name,
                service = %input.service_name,
                "creating app service"
            );
            db.services.push(Service {
                project_name: input.project_name,
                name: input.service_name,
                service_type: "app".to_string(),
                enabled: false,
                token: Uuid::new_v4().to_string(),
                env: input.env.unwrap_or_default(),
                notes: String::new(),
                deployments: 0,
                source: input.source.unwrap_or_default(),
                deploy: input.deploy.unwrap_or_default(),
            });
        }
        "services.common.setName" => {
            let input: SetNotes = input.parse()?;
            tracing::info!(
                project = %input.target.project_name,
                service = %input.target.service_name,
                "setting notes"
            );
            db.service_mut(None, &input.target)?.notes = input.notes;
        }
        "services.app.enableGithubDeploy" | "services.app.disableGithubDeploy" => {
            let target: ServiceRef = input.parse()?;
            let enable = procedure.ends_with("enableGithubDeploy");
            tracing::info!(
                project = %target.project_name,
                service = %target.service_name,
                enable,
                "toggling auto-deploy"
            );
            db.service_mut(Some("app"), &target)?.source.auto_deploy = enable;
        }
        "services.app.refreshDeployToken" => {
            let target: ServiceRef = input.parse()?;
            tracing::info!(
                project = %target.project_name,
                service = %target.service_name,
                "rotating deploy token"
            );
            db.service_mut(Some("app"), &target)?.token = Uuid::new_v4().to_string();
        }
        "users.createUser" => {
            let input: NewUser = input.parse()?;
            if input.email.is_empty() || input.password.is_empty() {
                return Err(bad_request("email and password are required".to_string()));
            }
            if db.users.iter().any(|u| u.email == input.email) {
                return Err((StatusCode::CONFLICT, format!("user {} already exists", input.email)));
            }
            tracing::info!(email = %input.email, admin = input.admin, "creating user");
            db.users.push(User {
                id: Uuid::new_v4().to_string(),
                created_at: SEED_TIME.to_string(),
                email: input.email,
                admin: input.admin,
                password: input.password,
                api_token: Uuid::new_v4().to_string(),
            });
        }
        other => {
            let (kind, action) = lifecycle(other)
                .ok_or_else(|| not_found(format!("no mutation procedure {other}")))?;
            let input: DeployInput = input.parse()?;
            tracing::info!(
                project = %input.target.project_name,
                service = %input.target.service_name,
                kind,
                ?action,
                force_rebuild = input.force_rebuild,
                "service lifecycle"
            );
            let service = db.service_mut(Some(kind), &input.target)?;
            match action {
                Lifecycle::Deploy => {
                    service.deployments += 1;
                    service.enabled = true;
                }
                Lifecycle::Start => service.enabled = true,
                Lifecycle::Stop => service.enabled = false,
                Lifecycle::Destroy => {
                    let (project, name) = (service.project_name.clone(), service.name.clone());
                    db.services.retain(|s| !(s.project_name == project && s.name == name));
                }
            }
        }
    }
    Ok(envelope(Value::Null))
}

fn system_stats(running: usize) -> Value {
    let cpu_used = 5.0 * running as f64;
    json!({
        "uptime": 3600.5,
        "memInfo": {
            "totalMemMb": 2048.0,
            "usedMemMb": 512.0,
            "freeMemMb": 1536.0,
            "usedMemPercentage": 25.0,
            "freeMemPercentage": 75.0
        },
        "diskInfo": {
            "totalGb": "40.0",
            "usedGb": "10.0",
            "freeGb": "30.0",
            "usedPercentage": "25.00",
            "freePercentage": "75.00"
        },
        "cpuInfo": {
            "usedPercentage": cpu_used,
            "count": 4,
            "loadavg": [0.1, 0.2, 0.3]
        },
        "network": { "inputMb": 1.5, "outputMb": 0.5 }
    })
}
