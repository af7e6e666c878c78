//! In-memory attachment store

use async_trait::async_trait;
use chrono::Utc;
use confstore_client::AttachmentStore;
use confstore_core::{AttachmentKey, LocalFile, StorageError};
use dashmap::DashMap;
use parking_lot::Mutex;
use url::Url;

pub const DEFAULT_BASE: &str = "https://files.test/private/";

#[derive(Debug)]
pub struct InMemoryAttachmentStore {
    base: Url,
    objects: DashMap<AttachmentKey, Vec<u8>>,
    uploads: Mutex<Vec<AttachmentKey>>,
    failure: Mutex<Option<StorageError>>,
}

impl Default for InMemoryAttachmentStore {
    fn default() -> Self {
        Self::with_base(Url::parse(DEFAULT_BASE).unwrap())
    }
}

impl InMemoryAttachmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose resolved URLs are `base` joined with the key
    #[must_use]
    pub fn with_base(base: Url) -> Self {
        Self {
            base,
            objects: DashMap::new(),
            uploads: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Make every later upload fail with `error`
    pub fn fail_uploads(&self, error: StorageError) {
        *self.failure.lock() = Some(error);
    }

    /// Keys of every successful upload, oldest first
    #[must_use]
    pub fn uploads(&self) -> Vec<AttachmentKey> {
        self.uploads.lock().clone()
    }

    #[must_use]
    pub fn object(&self, key: &AttachmentKey) -> Option<Vec<u8>> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn upload(&self, file: &LocalFile) -> Result<AttachmentKey, StorageError> {
        let failure = self.failure.lock().clone();
        if let Some(error) = failure {
            return Err(error);
        }

        let bytes = file.read().await.map_err(|e| StorageError::Read {
            name: file.name().to_string(),
            message: e.to_string(),
        })?;
        let key = AttachmentKey::generate(file.name(), Utc::now());
        self.objects.insert(key.clone(), bytes);
        self.uploads.lock().push(key.clone());
        Ok(key)
    }

    async fn resolve(&self, key: &AttachmentKey) -> Result<Url, StorageError> {
        self.base
            .join(key.as_str())
            .map_err(|e| StorageError::Resolve {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}
