//! Caller-side options for mutations.
//!
//! Every field is optional and defaults to "not supplied"; only fields the
//! caller sets end up in the request body (see `crate::payload`). Nested
//! groups (`source`, `build`, `deploy`, `resources`, `maintenance`) are sent
//! whole once any of their members is set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::payload::{FieldGroup, SparseFields};

/// Optional settings for `services.app.createService`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateServiceOptions {
    pub source: CreateSource,
    pub build: CreateBuild,
    /// Dotenv-formatted environment, one `KEY=value` per line.
    pub env: Option<String>,
    pub basic_auth: Vec<BasicAuth>,
    pub deploy: DeployOptions,
    pub domains: Vec<Value>,
    pub mounts: Vec<Value>,
    pub ports: Vec<Value>,
    pub resources: ResourceLimits,
    pub maintenance: Maintenance,
}

impl CreateServiceOptions {
    pub(crate) fn to_fields(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<SparseFields, ApiError> {
        SparseFields::builder()
            .required("projectName", project_name)
            .required("serviceName", service_name)
            .group("source", self.source.to_group())
            .group("build", self.build.to_group())
            .optional("env", &self.env)
            .optional("basicAuth", &self.basic_auth)
            .group("deploy", self.deploy.to_group())
            .optional("domains", &self.domains)
            .optional("mounts", &self.mounts)
            .optional("ports", &self.ports)
            .group("resources", self.resources.to_group())
            .group("maintenance", self.maintenance.to_group())
            .build()
    }
}

/// Where the service image or code comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateSource {
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub image: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CreateSource {
    fn to_group(&self) -> FieldGroup {
        FieldGroup::new()
            .member("type", &self.source_type)
            .member("image", &self.image)
            .member("username", &self.username)
            .member("password", &self.password)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateBuild {
    #[serde(rename = "type")]
    pub build_type: Option<String>,
    pub file: Option<String>,
}

impl CreateBuild {
    fn to_group(&self) -> FieldGroup {
        FieldGroup::new()
            .member("type", &self.build_type)
            .member("file", &self.file)
    }
}

/// HTTP basic auth credentials placed in front of the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployOptions {
    pub replicas: Option<u32>,
    pub command: Option<String>,
    pub zero_downtime: Option<bool>,
}

impl DeployOptions {
    fn to_group(&self) -> FieldGroup {
        FieldGroup::new()
            .member("replicas", &self.replicas)
            .member("command", &self.command)
            .member("zeroDowntime", &self.zero_downtime)
    }
}

/// Memory in megabytes, CPU in cores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceLimits {
    pub memory_reservation: Option<u64>,
    pub memory_limit: Option<u64>,
    pub cpu_reservation: Option<u64>,
    pub cpu_limit: Option<u64>,
}

impl ResourceLimits {
    fn to_group(&self) -> FieldGroup {
        FieldGroup::new()
            .member("memoryReservation", &self.memory_reservation)
            .member("memoryLimit", &self.memory_limit)
            .member("cpuReservation", &self.cpu_reservation)
            .member("cpuLimit", &self.cpu_limit)
    }
}

/// Maintenance page shown instead of the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Maintenance {
    pub enabled: Option<bool>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub custom_logo: Option<String>,
    pub custom_css: Option<String>,
    pub hide_logo: Option<bool>,
    pub hide_links: Option<bool>,
}

impl Maintenance {
    fn to_group(&self) -> FieldGroup {
        FieldGroup::new()
            .member("enabled", &self.enabled)
            .member("title", &self.title)
            .member("subtitle", &self.subtitle)
            .member("customLogo", &self.custom_logo)
            .member("customCss", &self.custom_css)
            .member("hideLogo", &self.hide_logo)
            .member("hideLinks", &self.hide_links)
    }
}

/// Options for the deploy procedures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployServiceOptions {
    /// Rebuild the image even if nothing changed.
    pub force_rebuild: Option<bool>,
}

impl DeployServiceOptions {
    pub(crate) fn to_fields(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<SparseFields, ApiError> {
        SparseFields::builder()
            .required("projectName", project_name)
            .required("serviceName", service_name)
            .optional("forceRebuild", &self.force_rebuild)
            .build()
    }
}

/// Input for `users.createUser`. All three fields are always sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub admin: bool,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            admin: false,
        }
    }

    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    pub(crate) fn to_fields(&self) -> Result<SparseFields, ApiError> {
        SparseFields::builder()
            .required("email", &self.email)
            .required("password", &self.password)
            .required("admin", &self.admin)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(fields: SparseFields) -> String {
        serde_json::to_string(&fields).unwrap()
    }

    #[test]
    fn default_create_options_send_only_names() {
        let fields = CreateServiceOptions::default().to_fields("p", "s").unwrap();
        assert_eq!(body(fields), r#"{"projectName":"p","serviceName":"s"}"#);
    }

    #[test]
    fn create_options_follow_declared_order() {
        let options = CreateServiceOptions {
            maintenance: Maintenance {
                title: Some("Back soon".into()),
                ..Default::default()
            },
            env: Some("PORT=80".into()),
            source: CreateSource {
                source_type: Some("image".into()),
                image: Some("nginx:latest".into()),
                ..Default::default()
            },
            ports: vec![json!({"published": 8080, "target": 80})],
            ..Default::default()
        };
        let fields = options.to_fields("p", "s").unwrap();
        let names: Vec<&str> = fields.names().collect();
        assert_eq!(names, ["projectName", "serviceName", "source", "env", "ports", "maintenance"]);
        assert_eq!(
            fields.get("source"),
            Some(&json!({"type": "image", "image": "nginx:latest", "username": "", "password": ""}))
        );
        assert_eq!(
            fields.get("maintenance"),
            Some(&json!({
                "enabled": false,
                "title": "Back soon",
                "subtitle": "",
                "customLogo": "",
                "customCss": "",
                "hideLogo": false,
                "hideLinks": false
            }))
        );
    }

    #[test]
    fn resource_group_is_complete_once_touched() {
        let options = CreateServiceOptions {
            resources: ResourceLimits {
                cpu_limit: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        let fields = options.to_fields("p", "s").unwrap();
        assert_eq!(
            fields.get("resources"),
            Some(&json!({
                "memoryReservation": 0,
                "memoryLimit": 0,
                "cpuReservation": 0,
                "cpuLimit": 2
            }))
        );
        assert!(!fields.contains("deploy"));
        assert!(!fields.contains("build"));
    }

    #[test]
    fn force_rebuild_only_when_requested() {
        let plain = DeployServiceOptions::default().to_fields("p", "s").unwrap();
        assert_eq!(body(plain), r#"{"projectName":"p","serviceName":"s"}"#);
        let forced = DeployServiceOptions {
            force_rebuild: Some(true),
        }
        .to_fields("p", "s")
        .unwrap();
        assert_eq!(body(forced), r#"{"projectName":"p","serviceName":"s","forceRebuild":true}"#);
    }

    #[test]
    fn new_user_always_sends_admin_flag() {
        let fields = NewUser::new("a@b.c", "hunter22").to_fields().unwrap();
        assert_eq!(body(fields), r#"{"email":"a@b.c","password":"hunter22","admin":false}"#);
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let options: CreateServiceOptions = serde_json::from_str(
            r#"{"env":"A=1","resources":{"memoryLimit":256},"basicAuth":[{"username":"u","password":"p"}]}"#,
        )
        .unwrap();
        assert_eq!(options.env.as_deref(), Some("A=1"));
        assert_eq!(options.resources.memory_limit, Some(256));
        assert_eq!(options.basic_auth.len(), 1);
    }
}
