//! confstore Core
//!
//! Domain model shared by the client and the views:
//! - [`ConfigItem`] and its write payload, draft and loaded forms
//! - Error taxonomy (validation vs. remote failures)
//! - Pre-flight validation of drafts and attachments
//! - Display formatting for dates and attachment names
//! - Process-wide [`Session`] holding the caller's credentials
//! - [`AppConfig`] loading from TOML and environment
//!
//! # Example
//!
//! ```rust,ignore
//! use confstore_core::{validation, ConfigDraft, LocalFile};
//!
//! let mut draft = ConfigDraft::new("feature-flags", "beta=true");
//! draft.attachment = Some(LocalFile::from_bytes("notes.txt", b"hello".to_vec()));
//!
//! validation::validate_draft(&draft, 5_000_000)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod format;
pub mod session;
pub mod types;
pub mod validation;

pub use config::{ApiConfig, AppConfig, AuthConfig, StorageConfig};
pub use error::{ApiError, ConfigError, StorageError, ValidationError};
pub use session::{Credentials, Session, SessionReader};
pub use types::{
    AttachmentKey, ConfigDraft, ConfigId, ConfigItem, ConfigPayload, FileSource, LoadedConfig,
    LocalFile,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
