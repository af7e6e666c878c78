//! Front-end seams and the context views are mounted with
//!
//! A view never talks to a terminal or a window. It reports through
//! [`Notifier`], asks yes/no questions through [`ConfirmPrompt`], and reaches
//! remote services through the clients in [`AppContext`].

use confstore_client::{AttachmentStore, ConfigApi, HttpAttachmentStore, HttpConfigApi};
use confstore_core::{AppConfig, SessionReader};
use std::sync::Arc;

/// A user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Input was rejected before any remote call
    Invalid(String),
    /// A remote call failed
    Failed(String),
}

impl Notice {
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Invalid(message) | Self::Failed(message) => message,
        }
    }
}

/// Non-fatal error reporting (the front end's alert)
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Blocking yes/no confirmation
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(message = notice.message(), "notice");
    }
}

/// Prompt that answers every question with "no"
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclinePrompt;

impl ConfirmPrompt for DeclinePrompt {
    fn confirm(&self, question: &str) -> bool {
        tracing::debug!(question, "declining confirmation");
        false
    }
}

/// Prompt that answers every question with "yes"
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptPrompt;

impl ConfirmPrompt for AcceptPrompt {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

/// Everything a view needs, injected at mount time
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn ConfigApi>,
    pub store: Arc<dyn AttachmentStore>,
    pub notifier: Arc<dyn Notifier>,
    pub prompt: Arc<dyn ConfirmPrompt>,
    pub session: SessionReader,
    /// Largest attachment accepted before upload, in bytes
    pub max_attachment_size: u64,
}

impl AppContext {
    /// Context with logging notifier, declining prompt and the default limit
    #[must_use]
    pub fn new(
        api: Arc<dyn ConfigApi>,
        store: Arc<dyn AttachmentStore>,
        session: SessionReader,
    ) -> Self {
        Self {
            api,
            store,
            notifier: Arc::new(LogNotifier),
            prompt: Arc::new(DeclinePrompt),
            session,
            max_attachment_size: confstore_core::config::DEFAULT_MAX_ATTACHMENT_SIZE,
        }
    }

    /// HTTP-backed context for `config`
    ///
    /// # Errors
    /// Fails if either HTTP client cannot be built
    pub fn from_config(config: &AppConfig, session: SessionReader) -> anyhow::Result<Self> {
        let api = HttpConfigApi::new(&config.api, session.clone())?;
        let store = HttpAttachmentStore::new(&config.storage, session.clone())?;
        Ok(Self::new(Arc::new(api), Arc::new(store), session)
            .with_max_attachment_size(config.max_attachment_size))
    }

    #[inline]
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn ConfirmPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_attachment_size(mut self, bytes: u64) -> Self {
        self.max_attachment_size = bytes;
        self
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .field("max_attachment_size", &self.max_attachment_size)
            .finish_non_exhaustive()
    }
}
