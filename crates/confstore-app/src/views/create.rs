//! Create view: draft a new config, upload its attachment, submit

use crate::error::ViewError;
use crate::lifetime::ViewLifetime;
use crate::routes::Route;
use crate::state::ViewState;
use crate::ui::AppContext;
use crate::views::report;
use confstore_core::validation::validate_draft;
use confstore_core::{ConfigDraft, ConfigItem, LocalFile};

/// Render model of the create form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub config_name: String,
    pub content: String,
    /// Name of the picked file, if any
    pub file_name: Option<String>,
    pub submit_enabled: bool,
    pub is_loading: bool,
}

#[derive(Debug)]
pub struct CreateView {
    ctx: AppContext,
    lifetime: ViewLifetime,
    state: ViewState,
    draft: ConfigDraft,
}

impl CreateView {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            lifetime: ViewLifetime::new(),
            state: ViewState::Idle,
            draft: ConfigDraft::default(),
        }
    }

    pub fn set_config_name(&mut self, name: impl Into<String>) {
        self.draft.config_name = name.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    pub fn pick_file(&mut self, file: LocalFile) {
        tracing::debug!(name = file.name(), size = file.size(), "file picked");
        self.draft.attachment = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.draft.attachment = None;
    }

    #[inline]
    #[must_use]
    pub fn draft(&self) -> &ConfigDraft {
        &self.draft
    }

    /// Non-empty content and nothing in flight
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.draft.content.is_empty() && !self.state.is_busy()
    }

    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == ViewState::Saving
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

    #[must_use]
    pub fn render(&self) -> CreateForm {
        CreateForm {
            config_name: self.draft.config_name.clone(),
            content: self.draft.content.clone(),
            file_name: self.draft.attachment.as_ref().map(|f| f.name().to_string()),
            submit_enabled: self.can_submit(),
            is_loading: self.is_loading(),
        }
    }

    /// Validate, upload the picked file if any, then create the config
    ///
    /// Returns the route to navigate to on success. On failure the draft is
    /// kept so the user can retry.
    ///
    /// # Errors
    /// Validation and remote failures (already reported), `ViewError::Busy`
    /// while a submission is in flight, `ViewError::Unmounted`
    pub async fn submit(&mut self) -> Result<Route, ViewError> {
        if self.state.is_busy() {
            return Err(ViewError::Busy(self.state.clone()));
        }
        if let Err(invalid) = validate_draft(&self.draft, self.ctx.max_attachment_size) {
            let err = ViewError::from(invalid);
            report(&self.ctx, &err);
            return Err(err);
        }

        self.state.begin(ViewState::Saving)?;
        match self.persist().await {
            Ok(created) => {
                tracing::info!(
                    id = %created.config_id,
                    name = %created.config_name,
                    "config created"
                );
                self.state.transition_to(ViewState::Idle)?;
                Ok(Route::Home)
            }
            Err(ViewError::Unmounted) => Err(ViewError::Unmounted),
            Err(err) => {
                report(&self.ctx, &err);
                self.state.transition_to(ViewState::Failed(err.to_string()))?;
                Err(err)
            }
        }
    }

    async fn persist(&self) -> Result<ConfigItem, ViewError> {
        let attachment = match &self.draft.attachment {
            Some(file) => Some(self.lifetime.run(self.ctx.store.upload(file)).await?),
            None => None,
        };
        let payload = self.draft.to_payload(attachment);
        self.lifetime.run(self.ctx.api.create(&payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockNotifier;
    use crate::views::mocks::{item, MockApi, MockStore};
    use confstore_core::{AttachmentKey, Credentials, Session, StorageError, ValidationError};
    use mockall::predicate::always;
    use std::sync::Arc;

    fn view(api: MockApi, store: MockStore, notifier: MockNotifier) -> CreateView {
        let session = Session::authenticated(Credentials::new("tok"));
        let ctx = AppContext::new(Arc::new(api), Arc::new(store), session.reader())
            .with_notifier(Arc::new(notifier))
            .with_max_attachment_size(10);
        CreateView::new(ctx)
    }

    fn quiet() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        notifier
    }

    #[tokio::test]
    async fn empty_content_is_rejected_without_calls() {
        let mut api = MockApi::new();
        api.expect_create().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).return_const(());

        let mut view = view(api, MockStore::new(), notifier);
        view.set_config_name("A");
        assert!(!view.can_submit());

        let err = view.submit().await.unwrap_err();
        assert_eq!(err, ViewError::Validation(ValidationError::EmptyContent));
        assert_eq!(view.state(), &ViewState::Idle);
    }

    #[tokio::test]
    async fn oversized_file_is_never_uploaded() {
        let mut store = MockStore::new();
        store.expect_upload().never();
        let mut api = MockApi::new();
        api.expect_create().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).return_const(());

        let mut view = view(api, store, notifier);
        view.set_content("x");
        view.pick_file(LocalFile::from_bytes("big.bin", vec![0; 11]));

        let err = view.submit().await.unwrap_err();
        assert!(matches!(
            err,
            ViewError::Validation(ValidationError::AttachmentTooLarge { size: 11, limit: 10 })
        ));
    }

    #[tokio::test]
    async fn uploads_then_creates_with_key() {
        let mut store = MockStore::new();
        store
            .expect_upload()
            .times(1)
            .returning(|_| Ok(AttachmentKey::new("1700000000-a.txt")));
        let mut api = MockApi::new();
        api.expect_create()
            .withf(|payload| {
                payload.config_name == "A"
                    && payload.content == "x"
                    && payload.attachment == Some(AttachmentKey::new("1700000000-a.txt"))
            })
            .times(1)
            .returning(|_| Ok(item("c-1", "A", "x")));

        let mut view = view(api, store, quiet());
        view.set_config_name("A");
        view.set_content("x");
        view.pick_file(LocalFile::from_bytes("a.txt", b"hi".to_vec()));

        assert_eq!(view.submit().await, Ok(Route::Home));
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn failed_upload_keeps_draft_and_skips_create() {
        let mut store = MockStore::new();
        store
            .expect_upload()
            .with(always())
            .returning(|_| Err(StorageError::Upload("denied".to_string())));
        let mut api = MockApi::new();
        api.expect_create().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).return_const(());

        let mut view = view(api, store, notifier);
        view.set_content("x");
        view.pick_file(LocalFile::from_bytes("a.txt", b"hi".to_vec()));

        let err = view.submit().await.unwrap_err();
        assert!(err.is_remote());
        assert!(!view.is_loading());
        assert_eq!(view.draft().content, "x");
        assert!(view.draft().attachment.is_some());
        assert!(view.can_submit());
    }

    #[test]
    fn render_reflects_draft() {
        let mut view = view(MockApi::new(), MockStore::new(), quiet());
        view.set_config_name("A");
        view.set_content("x");
        view.pick_file(LocalFile::from_bytes("a.txt", Vec::new()));
        view.clear_file();

        let form = view.render();
        assert_eq!(form.file_name, None);
        assert!(form.submit_enabled);
        assert!(!form.is_loading);
    }
}
