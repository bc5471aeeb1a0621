//! Async façade: one method per remote procedure.
//!
//! Each method builds the request with `PanelClient`, sends it through the
//! configured `Transport`, and parses the response. Nothing is cached and no
//! state is shared between calls beyond the immutable client and transport,
//! so an `Easypanel` can be cloned or shared across tasks freely. Dropping a
//! returned future cancels the in-flight request.
//!
//! # Absent payloads
//! A query whose response is valid JSON but carries no payload (for example
//! `{"result":{}}`) does not fail: the plain methods return the type's zero
//! value (`Vec::new()`, `User::default()`, `SystemStats::default()`, ...).
//! An all-default result is therefore ambiguous between "really empty" and
//! "payload missing". The `try_*` variants return `Option<T>` and keep that
//! distinction.
//!
//! Mutations never fall back: they return `Ok(())` on a 2xx status and an
//! error otherwise.

use crate::client::PanelClient;
use crate::config::ClientConfig;
use crate::endpoint::ServiceKind;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    CreateServiceOptions, DeployServiceOptions, NewUser, Project, Service, SystemStats, User,
};

/// Client for one Easypanel instance.
#[derive(Debug, Clone)]
pub struct Easypanel<T = ReqwestTransport> {
    client: PanelClient,
    transport: T,
}

impl Easypanel<ReqwestTransport> {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::with_transport(PanelClient::from_config(config), transport))
    }

    /// Configure from `EASYPANEL_URL`, `EASYPANEL_API_KEY` and
    /// `EASYPANEL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(&ClientConfig::from_env()?)
    }
}

impl<T: Transport> Easypanel<T> {
    pub fn with_transport(client: PanelClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// The request builder, for callers that want to drive requests by hand.
    pub fn client(&self) -> &PanelClient {
        &self.client
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        tracing::debug!(%method, url = %request.url, "sending request");
        let response = self.transport.send(request).await.map_err(|err| {
            tracing::warn!(%method, error = %err, "request failed before a response");
            err
        })?;
        if response.is_success() {
            tracing::debug!(
                status = response.status,
                bytes = response.body.len(),
                uri = %response.uri,
                "response received"
            );
        } else {
            tracing::warn!(status = response.status, uri = %response.uri, "request rejected");
        }
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All projects. Empty if the response carries no payload.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        Ok(or_default(self.try_list_projects().await?, "projects"))
    }

    pub async fn try_list_projects(&self) -> Result<Option<Vec<Project>>, ApiError> {
        let response = self.execute(self.client.build_list_projects()).await?;
        self.client.parse_list_projects(response)
    }

    /// All services across projects. Empty if the response carries no
    /// payload. Makes its own round-trip even though the endpoint is the one
    /// `list_projects` uses.
    pub async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        Ok(or_default(self.try_list_services().await?, "services"))
    }

    pub async fn try_list_services(&self) -> Result<Option<Vec<Service>>, ApiError> {
        let response = self.execute(self.client.build_list_services()).await?;
        self.client.parse_list_services(response)
    }

    /// One service. `Service::default()` if the response carries no payload.
    pub async fn inspect_service(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<Service, ApiError> {
        Ok(or_default(self.try_inspect_service(project_name, service_name).await?, "service"))
    }

    pub async fn try_inspect_service(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<Option<Service>, ApiError> {
        let response = self
            .execute(self.client.build_inspect_service(project_name, service_name)?)
            .await?;
        self.client.parse_inspect_service(response)
    }

    /// One project. `Project::default()` if the response carries no payload.
    pub async fn inspect_project(&self, project_name: &str) -> Result<Project, ApiError> {
        Ok(or_default(self.try_inspect_project(project_name).await?, "project"))
    }

    pub async fn try_inspect_project(
        &self,
        project_name: &str,
    ) -> Result<Option<Project>, ApiError> {
        let response = self.execute(self.client.build_inspect_project(project_name)?).await?;
        self.client.parse_inspect_project(response)
    }

    /// The user the API key belongs to. `User::default()` if the response
    /// carries no payload.
    pub async fn get_user(&self) -> Result<User, ApiError> {
        Ok(or_default(self.try_get_user().await?, "user"))
    }

    pub async fn try_get_user(&self) -> Result<Option<User>, ApiError> {
        let response = self.execute(self.client.build_get_user()).await?;
        self.client.parse_get_user(response)
    }

    /// Host telemetry. The all-zero `SystemStats::default()` if the response
    /// carries no payload.
    pub async fn get_system_stats(&self) -> Result<SystemStats, ApiError> {
        Ok(or_default(self.try_get_system_stats().await?, "system stats"))
    }

    pub async fn try_get_system_stats(&self) -> Result<Option<SystemStats>, ApiError> {
        let response = self.execute(self.client.build_get_system_stats()).await?;
        self.client.parse_get_system_stats(response)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create an app service. Only options that are set are sent.
    pub async fn create_service(
        &self,
        project_name: &str,
        service_name: &str,
        options: &CreateServiceOptions,
    ) -> Result<(), ApiError> {
        let request = self.client.build_create_service(project_name, service_name, options)?;
        self.mutate(request).await
    }

    pub async fn deploy_app(
        &self,
        project_name: &str,
        service_name: &str,
        options: &DeployServiceOptions,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_deploy_service(ServiceKind::App, project_name, service_name, options)?;
        self.mutate(request).await
    }

    pub async fn start_app(&self, project_name: &str, service_name: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .build_start_service(ServiceKind::App, project_name, service_name)?;
        self.mutate(request).await
    }

    pub async fn stop_app(&self, project_name: &str, service_name: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .build_stop_service(ServiceKind::App, project_name, service_name)?;
        self.mutate(request).await
    }

    pub async fn destroy_app(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_destroy_service(ServiceKind::App, project_name, service_name)?;
        self.mutate(request).await
    }

    pub async fn deploy_compose(
        &self,
        project_name: &str,
        service_name: &str,
        options: &DeployServiceOptions,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_deploy_service(ServiceKind::Compose, project_name, service_name, options)?;
        self.mutate(request).await
    }

    pub async fn start_compose(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_start_service(ServiceKind::Compose, project_name, service_name)?;
        self.mutate(request).await
    }

    pub async fn stop_compose(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_stop_service(ServiceKind::Compose, project_name, service_name)?;
        self.mutate(request).await
    }

    pub async fn destroy_compose(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_destroy_service(ServiceKind::Compose, project_name, service_name)?;
        self.mutate(request).await
    }

    /// Replace the free-text note shown on the service.
    pub async fn set_service_notes(
        &self,
        project_name: &str,
        service_name: &str,
        notes: &str,
    ) -> Result<(), ApiError> {
        let request = self.client.build_set_service_notes(project_name, service_name, notes)?;
        self.mutate(request).await
    }

    /// Redeploy automatically when the source repository is pushed to.
    pub async fn enable_github_deploy(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<(), ApiError> {
        let request = self.client.build_enable_github_deploy(project_name, service_name)?;
        self.mutate(request).await
    }

    pub async fn disable_github_deploy(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<(), ApiError> {
        let request = self.client.build_disable_github_deploy(project_name, service_name)?;
        self.mutate(request).await
    }

    /// Issue a new deploy webhook token; the old one stops working.
    pub async fn refresh_deploy_token(
        &self,
        project_name: &str,
        service_name: &str,
    ) -> Result<(), ApiError> {
        let request = self.client.build_refresh_deploy_token(project_name, service_name)?;
        self.mutate(request).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        let request = self.client.build_create_user(user)?;
        self.mutate(request).await
    }

    async fn mutate(&self, request: HttpRequest) -> Result<(), ApiError> {
        let response = self.execute(request).await?;
        self.client.parse_mutation(response)
    }
}

fn or_default<V: Default>(payload: Option<V>, what: &str) -> V {
    payload.unwrap_or_else(|| {
        tracing::warn!(payload = what, "response carried no payload; using the empty default");
        V::default()
    })
}
