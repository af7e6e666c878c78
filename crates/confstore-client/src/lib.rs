//! confstore remote clients
//!
//! The two external collaborators of the views, each behind a trait so the
//! views can be driven by fakes in tests:
//! - [`ConfigApi`]: CRUD and rollback against the `/config` resource
//! - [`AttachmentStore`]: upload a file, resolve a key to a URL
//!
//! [`HttpConfigApi`] and [`HttpAttachmentStore`] are the `reqwest`-backed
//! implementations. Both read credentials from a
//! [`SessionReader`](confstore_core::SessionReader) on every call.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod http;
pub mod storage;

pub use api::ConfigApi;
pub use http::HttpConfigApi;
pub use storage::{AttachmentStore, HttpAttachmentStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
