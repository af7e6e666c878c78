//! Testing utilities for the confstore workspace
//!
//! In-memory fakes for the remote collaborators, recording front-end seams,
//! and a [`TestApp`] fixture that wires them into an [`AppContext`].

#![allow(missing_docs)]

pub mod api;
pub mod store;

pub use api::{ApiCall, InMemoryConfigApi, Operation};
pub use store::InMemoryAttachmentStore;

use chrono::{TimeZone, Utc};
use confstore_app::{AppContext, ConfirmPrompt, Notice, Notifier, Router};
use confstore_core::{AttachmentKey, ConfigId, ConfigItem, Credentials, Session};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_IDENTITY: &str = "test-identity";

/// Notifier that keeps every notice
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Prompt that plays back scripted answers, then declines
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answer(&self, yes: bool) {
        self.answers.lock().push_back(yes);
    }

    /// Every question asked so far
    #[must_use]
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().push(question.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}

/// Fakes wired together around one session
#[derive(Debug)]
pub struct TestApp {
    pub session: Session,
    pub api: Arc<InMemoryConfigApi>,
    pub store: Arc<InMemoryAttachmentStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub prompt: Arc<ScriptedPrompt>,
    pub max_attachment_size: u64,
}

impl TestApp {
    fn with_session(session: Session) -> Self {
        Self {
            session,
            api: Arc::new(InMemoryConfigApi::new()),
            store: Arc::new(InMemoryAttachmentStore::new()),
            notifier: Arc::new(RecordingNotifier::default()),
            prompt: Arc::new(ScriptedPrompt::default()),
            max_attachment_size: confstore_core::config::DEFAULT_MAX_ATTACHMENT_SIZE,
        }
    }

    #[must_use]
    pub fn signed_in() -> Self {
        Self::with_session(Session::authenticated(
            Credentials::new(TEST_TOKEN).with_identity(TEST_IDENTITY),
        ))
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::with_session(Session::anonymous())
    }

    #[must_use]
    pub fn with_api(mut self, api: InMemoryConfigApi) -> Self {
        self.api = Arc::new(api);
        self
    }

    #[must_use]
    pub fn with_max_attachment_size(mut self, bytes: u64) -> Self {
        self.max_attachment_size = bytes;
        self
    }

    /// Context for mounting a view against the fakes
    #[must_use]
    pub fn context(&self) -> AppContext {
        AppContext::new(
            Arc::clone(&self.api) as _,
            Arc::clone(&self.store) as _,
            self.session.reader(),
        )
        .with_notifier(Arc::clone(&self.notifier) as _)
        .with_prompt(Arc::clone(&self.prompt) as _)
        .with_max_attachment_size(self.max_attachment_size)
    }

    #[must_use]
    pub fn router(&self) -> Router {
        Router::new(self.session.reader())
    }
}

/// Stored item fixture with a fixed creation time
#[must_use]
pub fn stored_item(id: &str, name: &str, content: &str) -> ConfigItem {
    ConfigItem {
        config_id: ConfigId::new(id),
        config_name: name.to_string(),
        content: content.to_string(),
        attachment: None,
        created_at: Utc.timestamp_millis_opt(1_700_000_000_000).single(),
    }
}

/// [`stored_item`] with an attachment key
#[must_use]
pub fn stored_item_with_attachment(id: &str, name: &str, content: &str, key: &str) -> ConfigItem {
    ConfigItem {
        attachment: Some(AttachmentKey::new(key)),
        ..stored_item(id, name, content)
    }
}
