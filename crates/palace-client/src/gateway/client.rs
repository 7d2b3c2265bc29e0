use std::time::Duration;

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    GatewayError, GatewayOperation, MULTIPART_CONTENT_FIELD, MULTIPART_PHOTO_FIELD,
    PATH_AUTH_ME, PATH_AUTH_NEXTAUTH, PATH_HEALTH, PATH_MEMORIES, PATH_MEMORIES_CLUSTERS,
    PATH_MEMORIES_RECENT, PATH_MEMORIES_SEARCH, PATH_ONBOARDING_PILLARS, PATH_ONBOARDING_STATUS,
    PATH_PILLARS,
};
use crate::config::{ClientConfig, ConfigError};
use crate::models::{
    AuthTokenResponse, BackendErrorBody, BackendUser, CreateMemoryJsonRequest, CreatedMemory,
    GroupedPillars, HealthStatus, Memory, MemoryClusters, NextAuthRequest,
    OnboardingPillarsRequest, OnboardingStatus, OnboardingSubmitResponse, SearchMemoriesRequest,
};
use crate::session::AccessToken;
use crate::validation::MemoryDraft;

/// HTTP client for the Memory Palace backend.
///
/// Every call is a single attempt. A 401 always surfaces as
/// [`GatewayError::Unauthorized`] so callers can drop the session.
#[derive(Clone)]
pub struct BackendGateway {
    base_url: String,
    http_client: reqwest::Client,
}

impl BackendGateway {
    pub fn new(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self::new(config.api_base_url.clone(), http_client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn exchange_identity(
        &self,
        request: &NextAuthRequest,
    ) -> Result<AuthTokenResponse, GatewayError> {
        let builder = self
            .http_client
            .post(self.url(PATH_AUTH_NEXTAUTH))
            .json(request);

        self.send(GatewayOperation::ExchangeIdentity, builder).await
    }

    pub async fn current_user(&self, token: &AccessToken) -> Result<BackendUser, GatewayError> {
        let builder = self.authorized(self.http_client.get(self.url(PATH_AUTH_ME)), token);
        self.send(GatewayOperation::CurrentUser, builder).await
    }

    pub async fn onboarding_status(
        &self,
        token: &AccessToken,
    ) -> Result<OnboardingStatus, GatewayError> {
        let builder = self.authorized(
            self.http_client.get(self.url(PATH_ONBOARDING_STATUS)),
            token,
        );
        self.send(GatewayOperation::OnboardingStatus, builder).await
    }

    pub async fn submit_onboarding(
        &self,
        token: &AccessToken,
        pillars: &OnboardingPillarsRequest,
    ) -> Result<OnboardingSubmitResponse, GatewayError> {
        let builder = self.authorized(
            self.http_client
                .post(self.url(PATH_ONBOARDING_PILLARS))
                .json(pillars),
            token,
        );
        self.send(GatewayOperation::SubmitOnboarding, builder).await
    }

    pub async fn pillars(&self, token: &AccessToken) -> Result<GroupedPillars, GatewayError> {
        let builder = self.authorized(self.http_client.get(self.url(PATH_PILLARS)), token);
        self.send(GatewayOperation::FetchPillars, builder).await
    }

    pub async fn fetch_recent(
        &self,
        token: &AccessToken,
        limit: u32,
    ) -> Result<Vec<Memory>, GatewayError> {
        let builder = self.authorized(
            self.http_client
                .get(self.url(PATH_MEMORIES_RECENT))
                .query(&[("limit", limit)]),
            token,
        );
        self.send(GatewayOperation::FetchRecent, builder).await
    }

    pub async fn search(
        &self,
        token: &AccessToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Memory>, GatewayError> {
        let payload = SearchMemoriesRequest {
            query: query.to_string(),
            limit,
        };
        let builder = self.authorized(
            self.http_client
                .post(self.url(PATH_MEMORIES_SEARCH))
                .json(&payload),
            token,
        );
        self.send(GatewayOperation::SearchMemories, builder).await
    }

    /// Sends JSON when the draft has no photos and multipart otherwise.
    pub async fn create_memory(
        &self,
        token: &AccessToken,
        draft: &MemoryDraft,
    ) -> Result<CreatedMemory, GatewayError> {
        let request = self.http_client.post(self.url(PATH_MEMORIES));
        let content = draft.content.trim().to_string();

        let request = if draft.photos.is_empty() {
            request.json(&CreateMemoryJsonRequest { content })
        } else {
            let mut form = Form::new().text(MULTIPART_CONTENT_FIELD, content);
            for photo in &draft.photos {
                let part = Part::bytes(photo.bytes.clone())
                    .file_name(photo.file_name.clone())
                    .mime_str(&photo.content_type)
                    .map_err(|err| GatewayError::InvalidRequest {
                        operation: GatewayOperation::CreateMemory,
                        message: format!("photo '{}' has an invalid type: {err}", photo.file_name),
                    })?;
                form = form.part(MULTIPART_PHOTO_FIELD, part);
            }
            request.multipart(form)
        };

        let builder = self.authorized(request, token);
        self.send(GatewayOperation::CreateMemory, builder).await
    }

    pub async fn memory_clusters(
        &self,
        token: &AccessToken,
    ) -> Result<MemoryClusters, GatewayError> {
        let builder = self.authorized(
            self.http_client.get(self.url(PATH_MEMORIES_CLUSTERS)),
            token,
        );
        self.send(GatewayOperation::FetchClusters, builder).await
    }

    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let builder = self.http_client.get(self.url(PATH_HEALTH));
        self.send(GatewayOperation::Health, builder).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
        token: &AccessToken,
    ) -> reqwest::RequestBuilder {
        builder.bearer_auth(token.expose())
    }

    async fn send<Res>(
        &self,
        operation: GatewayOperation,
        builder: reqwest::RequestBuilder,
    ) -> Result<Res, GatewayError>
    where
        Res: DeserializeOwned,
    {
        let response = builder.send().await.map_err(|err| {
            warn!("backend request for {operation} failed before a response: {err}");
            GatewayError::NetworkError {
                operation,
                message: err.to_string(),
            }
        })?;

        let status = response.status();
        // A 401 is final whatever the body looks like.
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend answered 401 for {operation}");
            return Err(GatewayError::Unauthorized { operation });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| GatewayError::NetworkError {
                operation,
                message: format!("failed to read backend response body: {err}"),
            })?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<BackendErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message());
            warn!(
                "backend answered {} for {operation}",
                status.as_u16()
            );
            return Err(GatewayError::ServerError {
                operation,
                status: status.as_u16(),
                detail,
            });
        }

        let parsed = serde_json::from_slice::<Res>(&bytes).map_err(|err| {
            warn!("backend response for {operation} did not decode: {err}");
            GatewayError::InvalidResponse {
                operation,
                message: format!("failed to parse backend success response: {err}"),
            }
        })?;
        debug!("backend {operation} succeeded with status {}", status.as_u16());

        Ok(parsed)
    }
}
