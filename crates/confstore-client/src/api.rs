//! Remote config API contract

use async_trait::async_trait;
use confstore_core::{ApiError, ConfigId, ConfigItem, ConfigPayload};

/// Operations on the `/config` resource
///
/// Implementations own transport, auth and timeouts. No retries: a failed
/// call is returned to the caller as is.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    /// `GET /config`: every config of the current user
    async fn list(&self) -> Result<Vec<ConfigItem>, ApiError>;

    /// `GET /config/{id}`
    async fn get(&self, id: &ConfigId) -> Result<ConfigItem, ApiError>;

    /// `POST /config`: returns the created item with its assigned id
    async fn create(&self, payload: &ConfigPayload) -> Result<ConfigItem, ApiError>;

    /// `PUT /config/{id}`
    async fn update(&self, id: &ConfigId, payload: &ConfigPayload) -> Result<(), ApiError>;

    /// `DELETE /config/{id}`
    async fn delete(&self, id: &ConfigId) -> Result<(), ApiError>;

    /// `PUT /config/{id}/rollback`: the server picks the target version
    async fn rollback(&self, id: &ConfigId) -> Result<(), ApiError>;
}
