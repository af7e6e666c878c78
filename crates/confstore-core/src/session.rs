//! Process-wide authentication state
//!
//! [`Session`] is owned by whatever signs the user in and out. Everything
//! else (route guards, views, remote clients) holds a [`SessionReader`],
//! which can observe the state but never change it.

use parking_lot::RwLock;
use std::sync::Arc;

/// Credentials handed to us by the identity provider
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    identity_id: Option<String>,
}

impl Credentials {
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            identity_id: None,
        }
    }

    /// Identity used to scope private attachment storage
    #[inline]
    #[must_use]
    pub fn with_identity(mut self, identity_id: impl Into<String>) -> Self {
        self.identity_id = Some(identity_id.into());
        self
    }

    /// Bearer token for API calls
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[inline]
    #[must_use]
    pub fn identity_id(&self) -> Option<&str> {
        self.identity_id.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("identity_id", &self.identity_id)
            .finish()
    }
}

/// Writable session, held by the auth side
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl Session {
    /// Signed-out session
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session that starts signed in
    #[must_use]
    pub fn authenticated(credentials: Credentials) -> Self {
        let session = Self::default();
        session.sign_in(credentials);
        session
    }

    pub fn sign_in(&self, credentials: Credentials) {
        tracing::debug!(identity = ?credentials.identity_id(), "session signed in");
        *self.inner.write() = Some(credentials);
    }

    pub fn sign_out(&self) {
        tracing::debug!("session signed out");
        *self.inner.write() = None;
    }

    /// Read-only handle sharing this session's state
    #[inline]
    #[must_use]
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            inner: Arc::clone(&self.inner),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }
}

/// Read-only view of a [`Session`]
#[derive(Debug, Clone)]
pub struct SessionReader {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl SessionReader {
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Snapshot of the current credentials
    #[inline]
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_follows_sign_in_and_out() {
        let session = Session::anonymous();
        let reader = session.reader();
        assert!(!reader.is_authenticated());

        session.sign_in(Credentials::new("t").with_identity("id-1"));
        assert!(reader.is_authenticated());
        assert_eq!(reader.credentials().unwrap().identity_id(), Some("id-1"));

        session.sign_out();
        assert!(!reader.is_authenticated());
        assert!(reader.credentials().is_none());
    }

    #[test]
    fn credentials_debug_hides_token() {
        let creds = Credentials::new("secret-token");
        assert!(!format!("{creds:?}").contains("secret-token"));
    }
}
