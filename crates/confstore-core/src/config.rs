//! Client configuration
//!
//! Resolution order: `env > file > defaults`. The file is either the
//! explicit path, `./confstore.toml`, or the user config directory.

use crate::error::ConfigError;
use crate::session::Credentials;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default attachment limit: 5 MB
pub const DEFAULT_MAX_ATTACHMENT_SIZE: u64 = 5_000_000;

const DEFAULT_API_ENDPOINT: &str = "http://localhost:3000/";
const DEFAULT_STORAGE_ENDPOINT: &str = "http://localhost:4569/";

pub const ENV_API_ENDPOINT: &str = "CONFSTORE_API_ENDPOINT";
pub const ENV_STORAGE_ENDPOINT: &str = "CONFSTORE_STORAGE_ENDPOINT";
pub const ENV_MAX_ATTACHMENT_SIZE: &str = "CONFSTORE_MAX_ATTACHMENT_SIZE";
pub const ENV_TOKEN: &str = "CONFSTORE_TOKEN";
pub const ENV_IDENTITY_ID: &str = "CONFSTORE_IDENTITY_ID";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Largest attachment accepted before upload, in bytes
    pub max_attachment_size: u64,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

/// Remote config API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Logical API name, used in logs
    pub name: String,
    /// Base URL; resource paths are joined onto it
    pub endpoint: Url,
    /// Request timeout; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
}

/// Attachment object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub endpoint: Url,
    /// Leading path segment of the private area
    pub prefix: String,
}

/// Credentials supplied out of band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub identity_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_attachment_size: DEFAULT_MAX_ATTACHMENT_SIZE,
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            name: "config".to_string(),
            endpoint: default_url(DEFAULT_API_ENDPOINT),
            timeout_secs: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_url(DEFAULT_STORAGE_ENDPOINT),
            prefix: "private".to_string(),
        }
    }
}

#[allow(clippy::expect_used)]
fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("default endpoints are valid URLs")
}

impl AppConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a different attachment limit
    #[inline]
    #[must_use]
    pub fn with_max_attachment_size(mut self, bytes: u64) -> Self {
        self.max_attachment_size = bytes;
        self
    }

    /// With a different API endpoint
    #[inline]
    #[must_use]
    pub fn with_api_endpoint(mut self, endpoint: Url) -> Self {
        self.api.endpoint = endpoint;
        self
    }

    /// With a different storage endpoint
    #[inline]
    #[must_use]
    pub fn with_storage_endpoint(mut self, endpoint: Url) -> Self {
        self.storage.endpoint = endpoint;
        self
    }

    /// Load a TOML file, without env overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed(path.into(), e))?;
        let parsed: Self =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(path.into(), e))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load from the explicit path or the first well-known location found
    ///
    /// Search order:
    /// 1. Explicit path (if provided)
    /// 2. `./confstore.toml`
    /// 3. `$XDG_CONFIG_HOME/confstore/config.toml` or `~/.config/confstore/config.toml`
    ///
    /// Returns defaults if no file is found.
    pub fn discover(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in default_candidates() {
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "using config file");
                return Self::load(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Discover, then apply environment overrides
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve_with_env(explicit_path, &|key| std::env::var(key).ok())
    }

    /// [`AppConfig::resolve`] with an injectable environment
    pub fn resolve_with_env(
        explicit_path: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::discover(explicit_path)?;
        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(
        &mut self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = env(ENV_API_ENDPOINT) {
            self.api.endpoint = parse_endpoint("api", &value)?;
        }
        if let Some(value) = env(ENV_STORAGE_ENDPOINT) {
            self.storage.endpoint = parse_endpoint("storage", &value)?;
        }
        if let Some(value) = env(ENV_MAX_ATTACHMENT_SIZE) {
            self.max_attachment_size =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: ENV_MAX_ATTACHMENT_SIZE,
                    value,
                })?;
        }
        if let Some(value) = env(ENV_TOKEN) {
            self.auth.token = Some(value);
        }
        if let Some(value) = env(ENV_IDENTITY_ID) {
            self.auth.identity_id = Some(value);
        }
        Ok(())
    }

    /// Check invariants not expressible in the types
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attachment_size == 0 {
            return Err(ConfigError::Invalid(
                "max_attachment_size must be greater than zero".to_string(),
            ));
        }
        if self.api.name.trim().is_empty() {
            return Err(ConfigError::Invalid("api.name must not be empty".to_string()));
        }
        if self.api.endpoint.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "api.endpoint {} cannot be used as a base URL",
                self.api.endpoint
            )));
        }
        if self.storage.endpoint.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "storage.endpoint {} cannot be used as a base URL",
                self.storage.endpoint
            )));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Credentials configured out of band, if a token is set
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        let token = self.auth.token.as_deref().filter(|t| !t.is_empty())?;
        let credentials = Credentials::new(token);
        Some(match &self.auth.identity_id {
            Some(identity) => credentials.with_identity(identity.clone()),
            None => credentials,
        })
    }
}

fn parse_endpoint(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint {
        field,
        value: value.to_string(),
        source,
    })
}

fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("confstore.toml")];

    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));
    if let Some(dir) = config_home {
        candidates.push(dir.join("confstore").join("config.toml"));
    }

    candidates
}
