//! Detail view: show one config, edit its content, save, delete, roll back
//!
//! The name is fixed after creation; only the content and the attachment
//! can change. Saving without picking a new file keeps the stored key.

use crate::error::ViewError;
use crate::lifetime::ViewLifetime;
use crate::routes::Route;
use crate::state::ViewState;
use crate::ui::AppContext;
use crate::views::report;
use confstore_core::validation::{validate_attachment, validate_content};
use confstore_core::{AttachmentKey, ConfigId, ConfigPayload, LoadedConfig, LocalFile};
use url::Url;

pub const DELETE_QUESTION: &str = "Are you sure you want to delete this config?";
pub const ROLLBACK_QUESTION: &str = "Are you sure you want to rollback?";

/// Link to the stored attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLink {
    /// File name without the generation prefix
    pub text: String,
    pub href: Url,
}

/// Render model of a loaded config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailForm {
    pub id: ConfigId,
    /// Read-only
    pub config_name: String,
    pub content: String,
    pub attachment: Option<AttachmentLink>,
    /// Name of a newly picked replacement file
    pub picked_file: Option<String>,
    pub save_enabled: bool,
    pub is_saving: bool,
    pub is_deleting: bool,
    pub is_rolling_back: bool,
}

#[derive(Debug)]
pub struct DetailView {
    ctx: AppContext,
    lifetime: ViewLifetime,
    state: ViewState,
    id: ConfigId,
    loaded: Option<LoadedConfig>,
    content: String,
    file: Option<LocalFile>,
}

impl DetailView {
    #[must_use]
    pub fn new(ctx: AppContext, id: ConfigId) -> Self {
        Self {
            ctx,
            lifetime: ViewLifetime::new(),
            state: ViewState::Idle,
            id,
            loaded: None,
            content: String::new(),
            file: None,
        }
    }

    /// Fetch the config and resolve its attachment URL
    ///
    /// # Errors
    /// The reported load failure, or `ViewError::Unmounted`
    pub async fn mount(&mut self) -> Result<(), ViewError> {
        self.state.begin(ViewState::Loading)?;
        match self.fetch().await {
            Ok(loaded) => {
                tracing::debug!(id = %self.id, "config loaded");
                self.content.clone_from(&loaded.item.content);
                self.file = None;
                self.loaded = Some(loaded);
                self.state.transition_to(ViewState::Loaded)
            }
            Err(ViewError::Unmounted) => Err(ViewError::Unmounted),
            Err(err) => {
                report(&self.ctx, &err);
                self.loaded = None;
                self.content.clear();
                self.file = None;
                self.state.transition_to(ViewState::Failed(err.to_string()))?;
                Err(err)
            }
        }
    }

    async fn fetch(&self) -> Result<LoadedConfig, ViewError> {
        let item = self.lifetime.run(self.ctx.api.get(&self.id)).await?;
        let attachment_url = match &item.attachment {
            Some(key) => Some(self.lifetime.run(self.ctx.store.resolve(key)).await?),
            None => None,
        };
        Ok(LoadedConfig::new(item, attachment_url))
    }

    #[must_use]
    pub fn render(&self) -> Option<DetailForm> {
        let loaded = self.loaded.as_ref()?;
        let attachment = loaded
            .item
            .attachment
            .as_ref()
            .zip(loaded.attachment_url.as_ref())
            .map(|(key, url)| AttachmentLink {
                text: key.display_name().to_string(),
                href: url.clone(),
            });

        Some(DetailForm {
            id: self.id.clone(),
            config_name: loaded.item.config_name.clone(),
            content: self.content.clone(),
            attachment,
            picked_file: self.file.as_ref().map(|f| f.name().to_string()),
            save_enabled: !self.content.is_empty() && !self.state.is_busy(),
            is_saving: self.state == ViewState::Saving,
            is_deleting: self.state == ViewState::Deleting,
            is_rolling_back: self.state == ViewState::RollingBack,
        })
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn pick_file(&mut self, file: LocalFile) {
        tracing::debug!(name = file.name(), size = file.size(), "replacement file picked");
        self.file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &ConfigId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn loaded(&self) -> Option<&LoadedConfig> {
        self.loaded.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    /// Upload a newly picked file if any, then update the config
    ///
    /// # Errors
    /// Validation and remote failures (already reported); the edited
    /// content is kept. `ViewError::Busy`, `ViewError::NotLoaded`,
    /// `ViewError::Unmounted`
    pub async fn save(&mut self) -> Result<Route, ViewError> {
        self.ready()?;
        if let Err(invalid) = validate_content(&self.content)
            .and_then(|()| validate_attachment(self.file.as_ref(), self.ctx.max_attachment_size))
        {
            let err = ViewError::from(invalid);
            report(&self.ctx, &err);
            return Err(err);
        }

        self.state.begin(ViewState::Saving)?;
        let outcome = self.persist().await;
        let key = self.settle("save", outcome)?;

        let replaced = self
            .loaded
            .as_ref()
            .is_some_and(|loaded| loaded.item.attachment != key);
        let link = match &key {
            Some(key) if replaced => self.link(key).await,
            _ => None,
        };
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.item.content.clone_from(&self.content);
            if replaced {
                loaded.item.attachment = key;
                loaded.attachment_url = link;
            }
        }
        self.file = None;
        Ok(Route::Home)
    }

    /// Retrieval URL of a freshly stored attachment; `None` if it cannot
    /// be resolved
    async fn link(&self, key: &AttachmentKey) -> Option<Url> {
        match self.lifetime.run(self.ctx.store.resolve(key)).await {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(
                    id = %self.id,
                    key = %key,
                    error = %err,
                    "attachment link unavailable"
                );
                None
            }
        }
    }

    async fn persist(&self) -> Result<Option<AttachmentKey>, ViewError> {
        let loaded = self.loaded.as_ref().ok_or(ViewError::NotLoaded)?;
        let attachment = match &self.file {
            Some(file) => Some(self.lifetime.run(self.ctx.store.upload(file)).await?),
            None => loaded.item.attachment.clone(),
        };
        let payload = ConfigPayload {
            config_name: loaded.item.config_name.clone(),
            content: self.content.clone(),
            attachment,
        };
        self.lifetime
            .run(self.ctx.api.update(&self.id, &payload))
            .await?;
        Ok(payload.attachment)
    }

    /// Delete after confirmation
    ///
    /// `Ok(None)` when the user declines; nothing is sent.
    ///
    /// # Errors
    /// As for [`save`](Self::save), without validation
    pub async fn delete(&mut self) -> Result<Option<Route>, ViewError> {
        self.ready()?;
        if !self.confirm(DELETE_QUESTION) {
            return Ok(None);
        }

        self.state.begin(ViewState::Deleting)?;
        let outcome = self.lifetime.run(self.ctx.api.delete(&self.id)).await;
        self.settle("delete", outcome)?;
        Ok(Some(Route::Home))
    }

    /// Roll back to the previous version after confirmation
    ///
    /// # Errors
    /// As for [`delete`](Self::delete)
    pub async fn rollback(&mut self) -> Result<Option<Route>, ViewError> {
        self.ready()?;
        if !self.confirm(ROLLBACK_QUESTION) {
            return Ok(None);
        }

        self.state.begin(ViewState::RollingBack)?;
        let outcome = self.lifetime.run(self.ctx.api.rollback(&self.id)).await;
        self.settle("rollback", outcome)?;
        Ok(Some(Route::Home))
    }

    /// Mutations start only from a settled, successfully loaded view
    fn ready(&self) -> Result<(), ViewError> {
        if self.state.is_busy() {
            return Err(ViewError::Busy(self.state.clone()));
        }
        if self.state != ViewState::Loaded || self.loaded.is_none() {
            return Err(ViewError::NotLoaded);
        }
        Ok(())
    }

    fn confirm(&self, question: &str) -> bool {
        let confirmed = self.ctx.prompt.confirm(question);
        if !confirmed {
            tracing::warn!(id = %self.id, question, "operation declined");
        }
        confirmed
    }

    /// Leave the in-flight state of a finished mutation
    fn settle<T>(
        &mut self,
        op: &'static str,
        outcome: Result<T, ViewError>,
    ) -> Result<T, ViewError> {
        match outcome {
            Ok(value) => {
                tracing::info!(id = %self.id, op, "config updated");
                self.state.transition_to(ViewState::Loaded)?;
                Ok(value)
            }
            Err(ViewError::Unmounted) => {
                tracing::warn!(id = %self.id, op, "view unmounted during request");
                Err(ViewError::Unmounted)
            }
            Err(err) => {
                report(&self.ctx, &err);
                self.state.transition_to(ViewState::Loaded)?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{MockConfirmPrompt, MockNotifier};
    use crate::views::mocks::{item, MockApi, MockStore};
    use confstore_core::{ApiError, ConfigItem, Credentials, Session, ValidationError};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn stored() -> ConfigItem {
        ConfigItem {
            attachment: Some(AttachmentKey::new("1700000000-report.pdf")),
            ..item("c-1", "Alpha", "old")
        }
    }

    fn loading_api() -> MockApi {
        let mut api = MockApi::new();
        api.expect_get()
            .with(eq(ConfigId::new("c-1")))
            .returning(|_| Ok(stored()));
        api
    }

    fn resolving_store() -> MockStore {
        let mut store = MockStore::new();
        store.expect_resolve().returning(|key| {
            Ok(Url::parse("https://files.test/private/")
                .unwrap()
                .join(key.as_str())
                .unwrap())
        });
        store
    }

    fn view(
        api: MockApi,
        store: MockStore,
        notifier: MockNotifier,
        prompt: MockConfirmPrompt,
    ) -> DetailView {
        let session = Session::authenticated(Credentials::new("tok"));
        let ctx = AppContext::new(Arc::new(api), Arc::new(store), session.reader())
            .with_notifier(Arc::new(notifier))
            .with_prompt(Arc::new(prompt));
        DetailView::new(ctx, ConfigId::new("c-1"))
    }

    fn notifier(times: usize) -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(times).return_const(());
        notifier
    }

    fn answering(answer: bool, question: &'static str) -> MockConfirmPrompt {
        let mut prompt = MockConfirmPrompt::new();
        prompt
            .expect_confirm()
            .withf(move |asked| asked == question)
            .times(1)
            .return_const(answer);
        prompt
    }

    #[tokio::test]
    async fn mount_renders_attachment_link() {
        let mut view = view(
            loading_api(),
            resolving_store(),
            notifier(0),
            MockConfirmPrompt::new(),
        );
        assert_eq!(view.render(), None);

        view.mount().await.unwrap();
        let form = view.render().unwrap();
        assert_eq!(form.config_name, "Alpha");
        assert_eq!(form.content, "old");
        let link = form.attachment.unwrap();
        assert_eq!(link.text, "report.pdf");
        assert_eq!(
            link.href.as_str(),
            "https://files.test/private/1700000000-report.pdf"
        );
        assert!(form.save_enabled);
    }

    #[tokio::test]
    async fn save_reuses_stored_key_and_name() {
        let mut api = loading_api();
        api.expect_update()
            .withf(|id, payload| {
                id.as_str() == "c-1"
                    && *payload
                        == ConfigPayload {
                            config_name: "Alpha".to_string(),
                            content: "new".to_string(),
                            attachment: Some(AttachmentKey::new("1700000000-report.pdf")),
                        }
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let mut store = resolving_store();
        store.expect_upload().never();

        let mut view = view(api, store, notifier(0), MockConfirmPrompt::new());
        view.mount().await.unwrap();
        view.set_content("new");

        assert_eq!(view.save().await, Ok(Route::Home));
        assert_eq!(view.state(), &ViewState::Loaded);
    }

    #[tokio::test]
    async fn failed_save_keeps_edits() {
        let mut api = loading_api();
        api.expect_update().returning(|_, _| {
            Err(ApiError::Status {
                status: 500,
                message: "kaboom".to_string(),
            })
        });

        let mut view = view(api, resolving_store(), notifier(1), MockConfirmPrompt::new());
        view.mount().await.unwrap();
        view.set_content("edited");

        assert!(view.save().await.unwrap_err().is_remote());
        let form = view.render().unwrap();
        assert_eq!(form.content, "edited");
        assert!(!form.is_saving);
        assert_eq!(view.state(), &ViewState::Loaded);
    }

    #[tokio::test]
    async fn empty_content_blocks_save() {
        let mut api = loading_api();
        api.expect_update().never();

        let mut view = view(api, resolving_store(), notifier(1), MockConfirmPrompt::new());
        view.mount().await.unwrap();
        view.set_content("");

        assert_eq!(
            view.save().await,
            Err(ViewError::Validation(ValidationError::EmptyContent))
        );
        assert!(!view.render().unwrap().save_enabled);
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let mut api = loading_api();
        api.expect_delete().never();

        let mut view = view(
            api,
            resolving_store(),
            notifier(0),
            answering(false, DELETE_QUESTION),
        );
        view.mount().await.unwrap();

        assert_eq!(view.delete().await, Ok(None));
        assert_eq!(view.state(), &ViewState::Loaded);
    }

    #[tokio::test]
    async fn confirmed_rollback_navigates_home() {
        let mut api = loading_api();
        api.expect_rollback()
            .with(eq(ConfigId::new("c-1")))
            .times(1)
            .returning(|_| Ok(()));

        let mut view = view(
            api,
            resolving_store(),
            notifier(0),
            answering(true, ROLLBACK_QUESTION),
        );
        view.mount().await.unwrap();

        assert_eq!(view.rollback().await, Ok(Some(Route::Home)));
    }

    #[tokio::test]
    async fn mutations_need_a_loaded_config() {
        let mut view = view(
            MockApi::new(),
            MockStore::new(),
            notifier(0),
            MockConfirmPrompt::new(),
        );
        assert_eq!(view.save().await, Err(ViewError::NotLoaded));
        assert_eq!(view.delete().await, Err(ViewError::NotLoaded));
    }

    #[tokio::test]
    async fn save_with_new_file_links_the_new_attachment() {
        let mut api = loading_api();
        api.expect_update().times(1).returning(|_, _| Ok(()));
        let mut store = resolving_store();
        store
            .expect_upload()
            .times(1)
            .returning(|_| Ok(AttachmentKey::new("1800000000-new.txt")));

        let mut view = view(api, store, notifier(0), MockConfirmPrompt::new());
        view.mount().await.unwrap();
        view.pick_file(LocalFile::from_bytes("new.txt", b"fresh".to_vec()));
        assert_eq!(view.save().await, Ok(Route::Home));

        let form = view.render().unwrap();
        assert_eq!(form.picked_file, None);
        assert_eq!(
            form.attachment,
            Some(AttachmentLink {
                text: "new.txt".to_string(),
                href: Url::parse("https://files.test/private/1800000000-new.txt").unwrap(),
            })
        );
    }

    #[tokio::test]
    async fn failed_remount_drops_the_form_and_blocks_mutations() {
        let mut api = MockApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(stored()));
        api.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ApiError::Transport("down".to_string())));
        api.expect_update().never();
        api.expect_delete().never();
        api.expect_rollback().never();
        let mut prompt = MockConfirmPrompt::new();
        prompt.expect_confirm().never();

        let mut view = view(api, resolving_store(), notifier(1), prompt);
        view.mount().await.unwrap();
        view.set_content("edited");
        assert!(view.mount().await.unwrap_err().is_remote());

        assert!(matches!(view.state(), ViewState::Failed(_)));
        assert_eq!(view.render(), None);
        assert_eq!(view.loaded(), None);
        assert_eq!(view.save().await, Err(ViewError::NotLoaded));
        assert_eq!(view.delete().await, Err(ViewError::NotLoaded));
        assert_eq!(view.rollback().await, Err(ViewError::NotLoaded));
    }

    #[tokio::test]
    async fn failed_load_is_reported() {
        let mut api = MockApi::new();
        api.expect_get()
            .returning(|id| Err(ApiError::NotFound(id.to_string())));

        let mut view = view(api, MockStore::new(), notifier(1), MockConfirmPrompt::new());
        assert!(view.mount().await.is_err());
        assert!(matches!(view.state(), ViewState::Failed(_)));
        assert_eq!(view.render(), None);
    }
}
