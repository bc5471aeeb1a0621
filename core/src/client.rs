//! Stateless HTTP request builder and response parser for the Easypanel API.
//!
//! # Design
//! `PanelClient` holds only the base URL and the optional API key, and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the round-trip in
//! between (see `Easypanel` for the async façade that does this for you).
//!
//! Query parsers return `Option<T>`: `None` means the response was valid
//! JSON but carried no payload. Mutation parsers only check the status.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::endpoint::{self, Endpoint, ServiceAction, ServiceKind};
use crate::envelope;
use crate::error::ApiError;
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE,
};
use crate::payload::SparseFields;
use crate::types::{
    CreateServiceOptions, DeployServiceOptions, NewUser, Project, ProjectsPayload, Service,
    ServicesPayload, SystemStats, User,
};

/// Synchronous, stateless client for the Easypanel API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Clone, PartialEq, Eq)]
pub struct PanelClient {
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for PanelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PanelClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Send `api_key` verbatim as the `Authorization` header. An empty key
    /// sends no header.
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = (!api_key.is_empty()).then(|| api_key.to_string());
        self
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(&config.base_url);
        match &config.api_key {
            Some(api_key) => client.with_api_key(api_key),
            None => client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn build_list_projects(&self) -> HttpRequest {
        self.request(&endpoint::LIST_PROJECTS_AND_SERVICES, None, None)
    }

    /// Same endpoint as `build_list_projects`; the response is read for its
    /// `services` member instead.
    pub fn build_list_services(&self) -> HttpRequest {
        self.request(&endpoint::LIST_PROJECTS_AND_SERVICES, None, None)
    }

    pub fn build_inspect_service(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.query(&endpoint::INSPECT_SERVICE, &[project_name, service_name])
    }

    pub fn build_inspect_project(&self, project_name: &str) -> Result<HttpRequest, ApiError> {
        self.query(&endpoint::INSPECT_PROJECT, &[project_name])
    }

    pub fn build_get_user(&self) -> HttpRequest {
        self.request(&endpoint::GET_USER, None, None)
    }

    pub fn build_get_system_stats(&self) -> HttpRequest {
        self.request(&endpoint::GET_SYSTEM_STATS, None, None)
    }

    pub fn parse_list_projects(
        &self,
        response: HttpResponse,
    ) -> Result<Option<Vec<Project>>, ApiError> {
        Ok(parse_payload::<ProjectsPayload>(response)?.map(|payload| payload.projects))
    }

    pub fn parse_list_services(
        &self,
        response: HttpResponse,
    ) -> Result<Option<Vec<Service>>, ApiError> {
        Ok(parse_payload::<ServicesPayload>(response)?.map(|payload| payload.services))
    }

    pub fn parse_inspect_service(
        &self,
        response: HttpResponse,
    ) -> Result<Option<Service>, ApiError> {
        parse_payload(response)
    }

    pub fn parse_inspect_project(
        &self,
        response: HttpResponse,
    ) -> Result<Option<Project>, ApiError> {
        parse_payload(response)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        parse_payload(response)
    }

    pub fn parse_get_system_stats(
        &self,
        response: HttpResponse,
    ) -> Result<Option<SystemStats>, ApiError> {
        parse_payload(response)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn build_create_service(
        &self,
        project_name: &str,
        service_name: &str,
        options: &CreateServiceOptions,
    ) -> Result<HttpRequest, ApiError> {
        let fields = options.to_fields(project_name, service_name)?;
        self.mutation(&endpoint::CREATE_APP_SERVICE, &fields)
    }

    pub fn build_deploy_service(
        &self,
        kind: ServiceKind,
        project_name: &str,
        service_name: &str,
        options: &DeployServiceOptions,
    ) -> Result<HttpRequest, ApiError> {
        let fields = options.to_fields(project_name, service_name)?;
        self.mutation(&endpoint::service_action(kind, ServiceAction::Deploy), &fields)
    }

    pub fn build_start_service(
        &self,
        kind: ServiceKind,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.service_mutation(
            &endpoint::service_action(kind, ServiceAction::Start),
            project_name,
            service_name,
        )
    }

    pub fn build_stop_service(
        &self,
        kind: ServiceKind,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.service_mutation(
            &endpoint::service_action(kind, ServiceAction::Stop),
            project_name,
            service_name,
        )
    }

    pub fn build_destroy_service(
        &self,
        kind: ServiceKind,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.service_mutation(
            &endpoint::service_action(kind, ServiceAction::Destroy),
            project_name,
            service_name,
        )
    }

    pub fn build_set_service_notes(
        &self,
        project_name: &str,
        service_name: &str,
        notes: &str,
    ) -> Result<HttpRequest, ApiError> {
        let fields = SparseFields::builder()
            .required("projectName", project_name)
            .required("serviceName", service_name)
            .required("notes", notes)
            .build()?;
        self.mutation(&endpoint::SET_SERVICE_NOTES, &fields)
    }

    pub fn build_enable_github_deploy(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.service_mutation(&endpoint::ENABLE_GITHUB_DEPLOY, project_name, service_name)
    }

    pub fn build_disable_github_deploy(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.service_mutation(&endpoint::DISABLE_GITHUB_DEPLOY, project_name, service_name)
    }

    pub fn build_refresh_deploy_token(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.service_mutation(&endpoint::REFRESH_DEPLOY_TOKEN, project_name, service_name)
    }

    pub fn build_create_user(&self, user: &NewUser) -> Result<HttpRequest, ApiError> {
        self.mutation(&endpoint::CREATE_USER, &user.to_fields()?)
    }

    /// Parse the response of any mutation. The body is not inspected.
    pub fn parse_mutation(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -----------------------------------------------------------------------
    // Request assembly
    // -----------------------------------------------------------------------

    fn request(
        &self,
        endpoint: &Endpoint,
        query: Option<String>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut url = format!("{}{}", self.base_url, endpoint.path);
        if let Some(query) = query {
            url.push('?');
            url.push_str(&query);
        }
        let mut headers = Vec::new();
        if let Some(api_key) = &self.api_key {
            headers.push((AUTHORIZATION.to_string(), api_key.clone()));
        }
        if body.is_some() {
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }
        HttpRequest {
            method: endpoint.method,
            url,
            headers,
            body,
        }
    }

    /// A GET whose declared parameters are zipped with `values` into the
    /// `input` query parameter.
    fn query(&self, endpoint: &Endpoint, values: &[&str]) -> Result<HttpRequest, ApiError> {
        debug_assert_eq!(endpoint.method, HttpMethod::Get);
        debug_assert_eq!(endpoint.params.len(), values.len());
        let fields = endpoint
            .params
            .iter()
            .zip(values)
            .fold(SparseFields::builder(), |builder, (name, value)| builder.required(name, *value))
            .build()?;
        let query = envelope::encode_query_input(&fields)?;
        Ok(self.request(endpoint, Some(query), None))
    }

    fn mutation<T: Serialize>(
        &self,
        endpoint: &Endpoint,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        debug_assert_eq!(endpoint.method, HttpMethod::Post);
        let body = envelope::encode(payload)?;
        Ok(self.request(endpoint, None, Some(body)))
    }

    fn service_mutation(
        &self,
        endpoint: &Endpoint,
        project_name: &str,
        service_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        let fields = SparseFields::builder()
            .required("projectName", project_name)
            .required("serviceName", service_name)
            .build()?;
        self.mutation(endpoint, &fields)
    }
}

/// Map non-success status codes to `ApiError::Status`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match ApiError::from_status(response.status, &response.uri, &response.body) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn parse_payload<T: DeserializeOwned>(response: HttpResponse) -> Result<Option<T>, ApiError> {
    check_status(&response)?;
    envelope::decode(&response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:3000";

    fn client() -> PanelClient {
        PanelClient::new(BASE)
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
            uri: format!("{BASE}/api/trpc/test"),
        }
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn build_list_projects_produces_correct_request() {
        let req = client().build_list_projects();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/trpc/projects.listProjectsAndServices");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn list_projects_and_services_share_a_request() {
        assert_eq!(client().build_list_projects(), client().build_list_services());
    }

    #[test]
    fn api_key_is_sent_verbatim() {
        let req = client().with_api_key("Bearer abc").build_get_user();
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));
        let req = client().with_api_key("").build_get_user();
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn inspect_service_encodes_input_query() {
        let req = client().build_inspect_service("demo", "web").unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/trpc/projects.inspectService?input=%7B%22json%22%3A%7B%22projectName%22%3A%22demo%22%2C%22serviceName%22%3A%22web%22%7D%7D"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn inspect_project_escapes_reserved_characters() {
        let req = client().build_inspect_project("a&b=c#d").unwrap();
        let query = req.url.split_once('?').unwrap().1;
        assert!(!query.contains('#'));
        assert!(!query.contains('&'));
        assert!(query.contains("a%26b%3Dc%23d"));
    }

    #[test]
    fn build_create_service_minimal_body() {
        let req = client()
            .build_create_service("p", "s", &CreateServiceOptions::default())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/trpc/services.app.createService");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(req.body.as_deref(), Some(r#"{"json":{"projectName":"p","serviceName":"s"}}"#));
    }

    #[test]
    fn build_deploy_compose_with_force_rebuild() {
        let options = DeployServiceOptions { force_rebuild: Some(true) };
        let req = client()
            .build_deploy_service(ServiceKind::Compose, "p", "s", &options)
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/trpc/services.compose.deployService");
        assert_eq!(body_json(&req)["json"]["forceRebuild"], true);
    }

    #[test]
    fn lifecycle_builders_target_kind_specific_paths() {
        let c = client();
        let req = c.build_stop_service(ServiceKind::App, "p", "s").unwrap();
        assert!(req.url.ends_with("/api/trpc/services.app.stopService"));
        let req = c.build_start_service(ServiceKind::Compose, "p", "s").unwrap();
        assert!(req.url.ends_with("/api/trpc/services.compose.startService"));
        let req = c.build_destroy_service(ServiceKind::App, "p", "s").unwrap();
        assert!(req.url.ends_with("/api/trpc/services.app.destroyService"));
        assert_eq!(
            body_json(&req),
            serde_json::json!({"json": {"projectName": "p", "serviceName": "s"}})
        );
    }

    #[test]
    fn build_set_service_notes_keeps_empty_notes() {
        let req = client().build_set_service_notes("p", "s", "").unwrap();
        assert!(req.url.ends_with("/api/trpc/services.common.setName"));
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"json":{"projectName":"p","serviceName":"s","notes":""}}"#)
        );
    }

    #[test]
    fn build_create_user_body() {
        let req = client().build_create_user(&NewUser::new("a@b.c", "pw").admin(true)).unwrap();
        assert!(req.url.ends_with("/api/trpc/users.createUser"));
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"json":{"email":"a@b.c","password":"pw","admin":true}}"#)
        );
    }

    #[test]
    fn parse_list_projects_success() {
        let body = r#"{"result":{"data":{"json":{"projects":[{"name":"demo","createdAt":"2024-01-01T00:00:00Z"}],"services":[]}}}}"#;
        let projects = client().parse_list_projects(response(200, body)).unwrap().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "demo");
    }

    #[test]
    fn parse_list_services_reads_other_half() {
        let body = r#"{"result":{"data":{"json":{"projects":[],"services":[{"projectName":"demo","name":"web","type":"app"}]}}}}"#;
        let services = client().parse_list_services(response(200, body)).unwrap().unwrap();
        assert_eq!(services[0].name, "web");
    }

    #[test]
    fn parse_get_system_stats_absent_payload() {
        let stats = client().parse_get_system_stats(response(200, r#"{"result":{}}"#)).unwrap();
        assert!(stats.is_none());
    }

    #[test]
    fn parse_status_error_carries_uri_status_and_body() {
        let err = client().parse_get_user(response(500, "internal error")).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert!(err.to_string().contains("http://localhost:3000/api/trpc/test"));
    }

    #[test]
    fn parse_mutation_ignores_body_on_success() {
        assert!(client().parse_mutation(response(200, "not json")).is_ok());
        assert!(client().parse_mutation(response(204, "")).is_ok());
    }

    #[test]
    fn parse_mutation_not_found() {
        let err = client().parse_mutation(response(404, "not found")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn parse_bad_json_is_decode_error() {
        let err = client().parse_list_projects(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = PanelClient::new("http://localhost:3000/").build_get_user();
        assert_eq!(req.url, "http://localhost:3000/api/trpc/auth.getUser");
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", client().with_api_key("secret"));
        assert!(!rendered.contains("secret"));
    }
}
