//! `reqwest` implementation of [`ConfigApi`]

use crate::api::ConfigApi;
use async_trait::async_trait;
use confstore_core::{ApiConfig, ApiError, ConfigId, ConfigItem, ConfigPayload, SessionReader};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const RESOURCE: &str = "config";
const ROLLBACK: &str = "rollback";

/// Build the shared HTTP client, applying the timeout when configured
pub(crate) fn build_client(timeout_secs: Option<u64>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// Append path segments to a base URL, ignoring its trailing slash
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

/// Config API over HTTP with bearer-token auth
#[derive(Debug, Clone)]
pub struct HttpConfigApi {
    client: Client,
    base: Url,
    name: String,
    session: SessionReader,
}

impl HttpConfigApi {
    /// Create a client for the configured endpoint
    ///
    /// # Errors
    /// `ApiError::Transport` if the HTTP client cannot be built
    pub fn new(config: &ApiConfig, session: SessionReader) -> Result<Self, ApiError> {
        let client = build_client(config.timeout_secs)
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, config, session))
    }

    /// Create with a caller-supplied `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, config: &ApiConfig, session: SessionReader) -> Self {
        Self {
            client,
            base: config.endpoint.clone(),
            name: config.name.clone(),
            session,
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        join_segments(&self.base, segments).ok_or_else(|| {
            ApiError::Transport(format!("endpoint {} cannot be a base URL", self.base))
        })
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let credentials = self
            .session
            .credentials()
            .ok_or(ApiError::Unauthenticated)?;
        let url = self.url(segments)?;
        tracing::debug!(api = %self.name, %method, %url, "sending request");
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(credentials.token()))
    }

    async fn send(&self, request: RequestBuilder, subject: &str) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response, subject).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        subject: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, subject).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

async fn check_status(response: Response, subject: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthenticated),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(subject.to_string())),
        _ => {
            let message = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ConfigApi for HttpConfigApi {
    async fn list(&self) -> Result<Vec<ConfigItem>, ApiError> {
        let request = self.request(Method::GET, &[RESOURCE])?;
        self.send_json(request, RESOURCE).await
    }

    async fn get(&self, id: &ConfigId) -> Result<ConfigItem, ApiError> {
        let request = self.request(Method::GET, &[RESOURCE, id.as_str()])?;
        self.send_json(request, id.as_str()).await
    }

    async fn create(&self, payload: &ConfigPayload) -> Result<ConfigItem, ApiError> {
        let request = self.request(Method::POST, &[RESOURCE])?.json(payload);
        self.send_json(request, RESOURCE).await
    }

    async fn update(&self, id: &ConfigId, payload: &ConfigPayload) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &[RESOURCE, id.as_str()])?
            .json(payload);
        self.send(request, id.as_str()).await.map(drop)
    }

    async fn delete(&self, id: &ConfigId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &[RESOURCE, id.as_str()])?;
        self.send(request, id.as_str()).await.map(drop)
    }

    async fn rollback(&self, id: &ConfigId) -> Result<(), ApiError> {
        let request = self.request(Method::PUT, &[RESOURCE, id.as_str(), ROLLBACK])?;
        self.send(request, id.as_str()).await.map(drop)
    }
}
