//! Attachment object store
//!
//! Files are stored in the caller's private area,
//! `{endpoint}/{prefix}/{identity_id}/{key}`, under a key generated at
//! upload time (see [`AttachmentKey::generate`]).

use crate::http::{build_client, join_segments};
use async_trait::async_trait;
use chrono::Utc;
use confstore_core::{AttachmentKey, Credentials, LocalFile, SessionReader, StorageConfig, StorageError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

/// Upload and retrieval of attachment blobs
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store `file` and return the key it was stored under
    async fn upload(&self, file: &LocalFile) -> Result<AttachmentKey, StorageError>;

    /// URL the attachment can be fetched from
    async fn resolve(&self, key: &AttachmentKey) -> Result<Url, StorageError>;
}

/// Object store reached with plain HTTP `PUT`/`GET`
#[derive(Debug, Clone)]
pub struct HttpAttachmentStore {
    client: Client,
    endpoint: Url,
    prefix: String,
    session: SessionReader,
}

impl HttpAttachmentStore {
    /// # Errors
    /// `StorageError::Upload` if the HTTP client cannot be built
    pub fn new(config: &StorageConfig, session: SessionReader) -> Result<Self, StorageError> {
        let client = build_client(None)
            .map_err(|e| StorageError::Upload(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, config, session))
    }

    #[must_use]
    pub fn with_client(client: Client, config: &StorageConfig, session: SessionReader) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            prefix: config.prefix.clone(),
            session,
        }
    }

    fn credentials(&self) -> Result<Credentials, StorageError> {
        self.session
            .credentials()
            .ok_or(StorageError::Unauthenticated)
    }

    fn object_url(&self, credentials: &Credentials, key: &AttachmentKey) -> Option<Url> {
        let mut segments: Vec<&str> = Vec::with_capacity(3);
        if !self.prefix.is_empty() {
            segments.push(&self.prefix);
        }
        if let Some(identity) = credentials.identity_id() {
            segments.push(identity);
        }
        segments.push(key.as_str());
        join_segments(&self.endpoint, &segments)
    }
}

#[async_trait]
impl AttachmentStore for HttpAttachmentStore {
    async fn upload(&self, file: &LocalFile) -> Result<AttachmentKey, StorageError> {
        let credentials = self.credentials()?;
        let key = AttachmentKey::generate(file.name(), Utc::now());
        let url = self
            .object_url(&credentials, &key)
            .ok_or_else(|| StorageError::Upload(format!("bad endpoint {}", self.endpoint)))?;

        let bytes = file.read().await.map_err(|e| StorageError::Read {
            name: file.name().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(%url, size = file.size(), "uploading attachment");
        let response = self
            .client
            .put(url)
            .bearer_auth(credentials.token())
            .header(CONTENT_TYPE, file.content_type())
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload(format!("status {status}: {body}")));
        }

        tracing::info!(key = %key, "attachment uploaded");
        Ok(key)
    }

    async fn resolve(&self, key: &AttachmentKey) -> Result<Url, StorageError> {
        let credentials = self.credentials()?;
        self.object_url(&credentials, key)
            .ok_or_else(|| StorageError::Resolve {
                key: key.to_string(),
                message: format!("bad endpoint {}", self.endpoint),
            })
    }
}
