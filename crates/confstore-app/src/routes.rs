//! Route table and auth guards
//!
//! [`Router::resolve`] is the only way the front end turns a path into a
//! view. Pages behind [`Guard::AuthenticatedOnly`] send signed-out users to
//! the login page with the original target preserved; pages behind
//! [`Guard::UnauthenticatedOnly`] send signed-in users back where they came
//! from.

use confstore_core::{ConfigId, SessionReader};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::form_urlencoded;

const REDIRECT_PARAM: &str = "redirect";

/// Bytes escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A page of the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// List view, or the landing page when signed out
    Home,
    Login { redirect: Option<String> },
    Signup,
    NewConfig,
    Config(ConfigId),
    NotFound(String),
}

/// Access rule attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    AuthenticatedOnly,
    UnauthenticatedOnly,
}

/// Outcome of resolving a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    /// Navigate to this path instead
    Redirect(String),
}

impl Route {
    /// Parse a `path[?query]` target
    #[must_use]
    pub fn parse(target: &str) -> Self {
        let (path, query) = split_target(target);
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login {
                redirect: query_param(query, REDIRECT_PARAM),
            },
            ["signup"] => Self::Signup,
            ["config", "new"] => Self::NewConfig,
            ["config", id] if !id.is_empty() => {
                Self::Config(ConfigId::new(percent_decode_str(id).decode_utf8_lossy()))
            }
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// Canonical path of this route
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login { redirect: None } => "/login".to_string(),
            Self::Login {
                redirect: Some(target),
            } => {
                let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
                format!("/login?{REDIRECT_PARAM}={encoded}")
            }
            Self::Signup => "/signup".to_string(),
            Self::NewConfig => "/config/new".to_string(),
            Self::Config(id) => {
                format!("/config/{}", utf8_percent_encode(id.as_str(), SEGMENT))
            }
            Self::NotFound(path) => path.clone(),
        }
    }

    #[must_use]
    pub fn guard(&self) -> Guard {
        match self {
            Self::Home | Self::NotFound(_) => Guard::Public,
            Self::Login { .. } | Self::Signup => Guard::UnauthenticatedOnly,
            Self::NewConfig | Self::Config(_) => Guard::AuthenticatedOnly,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Applies route guards against the current session
#[derive(Debug, Clone)]
pub struct Router {
    session: SessionReader,
}

impl Router {
    #[inline]
    #[must_use]
    pub fn new(session: SessionReader) -> Self {
        Self { session }
    }

    /// Resolve `target` to a route to render, or a redirect
    #[must_use]
    pub fn resolve(&self, target: &str) -> Resolution {
        let target = normalize(target);
        let route = Route::parse(&target);
        let authenticated = self.session.is_authenticated();

        let resolution = match (route.guard(), authenticated) {
            (Guard::AuthenticatedOnly, false) => Resolution::Redirect(
                Route::Login {
                    redirect: Some(target.clone()),
                }
                .path(),
            ),
            (Guard::UnauthenticatedOnly, true) => {
                let back = match &route {
                    Route::Login {
                        redirect: Some(redirect),
                    } if is_local_path(redirect) => redirect.clone(),
                    _ => "/".to_string(),
                };
                Resolution::Redirect(back)
            }
            _ => Resolution::Render(route),
        };

        if let Resolution::Redirect(to) = &resolution {
            tracing::debug!(from = %target, to = %to, "route guard redirect");
        }
        resolution
    }
}

fn normalize(target: &str) -> String {
    let target = target.trim();
    if target.starts_with('/') {
        target.to_string()
    } else {
        format!("/{target}")
    }
}

fn split_target(target: &str) -> (&str, &str) {
    let target = target.split('#').next().unwrap_or_default();
    target.split_once('?').unwrap_or((target, ""))
}

fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Same-origin absolute path (`/x`, but not protocol-relative `//host`)
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}
