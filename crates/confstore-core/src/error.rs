//! Error types for confstore
//!
//! Two families, split by where they are raised:
//! - [`ValidationError`]: caught before any remote call, never sent anywhere
//! - [`ApiError`] / [`StorageError`]: failures of the remote collaborators
//!
//! [`ConfigError`] covers loading the client configuration itself.

use std::path::PathBuf;

/// Pre-flight validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Content is required for create and update
    #[error("config content must not be empty")]
    EmptyContent,

    /// Picked attachment is over the configured limit
    #[error("Please pick a file smaller than {} MB.", megabytes(.limit))]
    AttachmentTooLarge {
        /// Size of the picked file in bytes
        size: u64,
        /// Configured maximum in bytes
        limit: u64,
    },
}

#[allow(clippy::cast_precision_loss, clippy::trivially_copy_pass_by_ref)]
fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1_000_000.0
}

/// Remote config API failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No credentials, or the server rejected them
    #[error("not signed in")]
    Unauthenticated,

    /// The requested config does not exist
    #[error("config not found: {0}")]
    NotFound(String),

    /// Non-success status from the server
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Network-level failure
    #[error("request failed: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Attachment store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No credentials for the private storage area
    #[error("not signed in")]
    Unauthenticated,

    /// The local file could not be read
    #[error("cannot read {name}: {message}")]
    Read { name: String, message: String },

    /// The store rejected or failed the upload
    #[error("upload failed: {0}")]
    Upload(String),

    /// The key could not be turned into a URL
    #[error("cannot resolve attachment {key}: {message}")]
    Resolve { key: String, message: String },
}

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFailed(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    ParseFailed(PathBuf, #[source] toml::de::Error),

    #[error("invalid {field} endpoint {value:?}: {source}")]
    InvalidEndpoint {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_message_states_megabytes() {
        let err = ValidationError::AttachmentTooLarge {
            size: 6_000_000,
            limit: 5_000_000,
        };
        assert_eq!(err.to_string(), "Please pick a file smaller than 5 MB.");

        let err = ValidationError::AttachmentTooLarge {
            size: 3_000_000,
            limit: 2_500_000,
        };
        assert_eq!(err.to_string(), "Please pick a file smaller than 2.5 MB.");
    }

    #[test]
    fn api_error_display() {
        let err = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(err.to_string().contains("500"));
    }
}
