//! In-memory config API

use async_trait::async_trait;
use chrono::Utc;
use confstore_client::ConfigApi;
use confstore_core::{ApiError, ConfigId, ConfigItem, ConfigPayload};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Which API operation a call was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Rollback,
}

/// A recorded call with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Get(ConfigId),
    Create(ConfigPayload),
    Update(ConfigId, ConfigPayload),
    Delete(ConfigId),
    Rollback(ConfigId),
}

impl ApiCall {
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::List => Operation::List,
            Self::Get(_) => Operation::Get,
            Self::Create(_) => Operation::Create,
            Self::Update(..) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
            Self::Rollback(_) => Operation::Rollback,
        }
    }
}

/// Config API backed by a map, with call recording and fault injection
///
/// Updates keep the previous version so `rollback` can restore it.
#[derive(Debug, Default)]
pub struct InMemoryConfigApi {
    items: DashMap<ConfigId, ConfigItem>,
    history: DashMap<ConfigId, Vec<ConfigItem>>,
    calls: Mutex<Vec<ApiCall>>,
    failures: DashMap<Operation, ApiError>,
    held: Mutex<HashSet<Operation>>,
}

impl InMemoryConfigApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored item
    #[must_use]
    pub fn with_item(self, item: ConfigItem) -> Self {
        self.items.insert(item.config_id.clone(), item);
        self
    }

    /// Make every later `op` fail with `error`
    pub fn fail(&self, op: Operation, error: ApiError) {
        self.failures.insert(op, error);
    }

    pub fn recover(&self, op: Operation) {
        self.failures.remove(&op);
    }

    /// Make every later `op` hang forever once recorded
    pub fn hold(&self, op: Operation) {
        self.held.lock().insert(op);
    }

    #[must_use]
    pub fn item(&self, id: &ConfigId) -> Option<ConfigItem> {
        self.items.get(id).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls of `op`
    #[must_use]
    pub fn count(&self, op: Operation) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.operation() == op)
            .count()
    }

    async fn enter(&self, call: ApiCall) -> Result<(), ApiError> {
        let op = call.operation();
        tracing::trace!(?call, "in-memory api call");
        self.calls.lock().push(call);

        let held = self.held.lock().contains(&op);
        if held {
            futures::future::pending::<()>().await;
        }
        match self.failures.get(&op) {
            Some(error) => Err(error.value().clone()),
            None => Ok(()),
        }
    }

    fn missing(id: &ConfigId) -> ApiError {
        ApiError::NotFound(id.to_string())
    }
}

#[async_trait]
impl ConfigApi for InMemoryConfigApi {
    async fn list(&self) -> Result<Vec<ConfigItem>, ApiError> {
        self.enter(ApiCall::List).await?;
        let mut items: Vec<ConfigItem> = self.items.iter().map(|e| e.value().clone()).collect();
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.config_id.cmp(&b.config_id))
        });
        Ok(items)
    }

    async fn get(&self, id: &ConfigId) -> Result<ConfigItem, ApiError> {
        self.enter(ApiCall::Get(id.clone())).await?;
        self.item(id).ok_or_else(|| Self::missing(id))
    }

    async fn create(&self, payload: &ConfigPayload) -> Result<ConfigItem, ApiError> {
        self.enter(ApiCall::Create(payload.clone())).await?;
        let item = ConfigItem {
            config_id: ConfigId::new(uuid::Uuid::new_v4().to_string()),
            config_name: payload.config_name.clone(),
            content: payload.content.clone(),
            attachment: payload.attachment.clone(),
            created_at: Some(Utc::now()),
        };
        self.items.insert(item.config_id.clone(), item.clone());
        Ok(item)
    }

    async fn update(&self, id: &ConfigId, payload: &ConfigPayload) -> Result<(), ApiError> {
        self.enter(ApiCall::Update(id.clone(), payload.clone()))
            .await?;
        let mut entry = self.items.get_mut(id).ok_or_else(|| Self::missing(id))?;
        self.history
            .entry(id.clone())
            .or_default()
            .push(entry.value().clone());
        entry.content.clone_from(&payload.content);
        entry.attachment.clone_from(&payload.attachment);
        Ok(())
    }

    async fn delete(&self, id: &ConfigId) -> Result<(), ApiError> {
        self.enter(ApiCall::Delete(id.clone())).await?;
        self.history.remove(id);
        self.items
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::missing(id))
    }

    async fn rollback(&self, id: &ConfigId) -> Result<(), ApiError> {
        self.enter(ApiCall::Rollback(id.clone())).await?;
        if !self.items.contains_key(id) {
            return Err(Self::missing(id));
        }
        let previous = self
            .history
            .get_mut(id)
            .and_then(|mut versions| versions.pop())
            .ok_or_else(|| ApiError::Status {
                status: 400,
                message: "no previous version".to_string(),
            })?;
        self.items.insert(id.clone(), previous);
        Ok(())
    }
}
