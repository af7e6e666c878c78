//! The three views of the application
//!
//! Each view owns an [`AppContext`], a [`ViewLifetime`](crate::lifetime::ViewLifetime)
//! and a [`ViewState`](crate::state::ViewState). Views never print: they
//! hand back render models and the [`Route`](crate::routes::Route) the front
//! end should navigate to.

pub mod create;
pub mod detail;
pub mod list;

pub use create::{CreateForm, CreateView};
pub use detail::{AttachmentLink, DetailForm, DetailView};
pub use list::{CreateEntry, ListEntry, ListRender, ListView};

use crate::error::ViewError;
use crate::ui::{AppContext, Notice};

/// Report a failure through the notifier and the log
pub(crate) fn report(ctx: &AppContext, err: &ViewError) {
    match err {
        ViewError::Unmounted => {}
        ViewError::Validation(invalid) => {
            tracing::warn!(error = %invalid, "input rejected");
            ctx.notifier.notify(Notice::Invalid(invalid.to_string()));
        }
        other => {
            tracing::error!(error = %other, "view operation failed");
            ctx.notifier.notify(Notice::Failed(other.to_string()));
        }
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use async_trait::async_trait;
    use confstore_client::{AttachmentStore, ConfigApi};
    use confstore_core::{
        ApiError, AttachmentKey, ConfigId, ConfigItem, ConfigPayload, LocalFile, StorageError,
    };
    use url::Url;

    mockall::mock! {
        pub Api {}

        #[async_trait]
        impl ConfigApi for Api {
            async fn list(&self) -> Result<Vec<ConfigItem>, ApiError>;
            async fn get(&self, id: &ConfigId) -> Result<ConfigItem, ApiError>;
            async fn create(&self, payload: &ConfigPayload) -> Result<ConfigItem, ApiError>;
            async fn update(&self, id: &ConfigId, payload: &ConfigPayload) -> Result<(), ApiError>;
            async fn delete(&self, id: &ConfigId) -> Result<(), ApiError>;
            async fn rollback(&self, id: &ConfigId) -> Result<(), ApiError>;
        }
    }

    mockall::mock! {
        pub Store {}

        #[async_trait]
        impl AttachmentStore for Store {
            async fn upload(&self, file: &LocalFile) -> Result<AttachmentKey, StorageError>;
            async fn resolve(&self, key: &AttachmentKey) -> Result<Url, StorageError>;
        }
    }

    pub(crate) fn item(id: &str, name: &str, content: &str) -> ConfigItem {
        ConfigItem {
            config_id: ConfigId::new(id),
            config_name: name.to_string(),
            content: content.to_string(),
            attachment: None,
            created_at: None,
        }
    }
}
