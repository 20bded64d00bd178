use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::form_urlencoded;

use crate::model::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    #[error("route must be an absolute in-app path: {0}")]
    NotAbsolute(String),
}

/// Login entry point.
pub const LOGIN_PATH: &str = "/login";

/// An in-app location: absolute path plus optional query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    path: String,
    query: Option<String>,
}

impl Route {
    /// Parse an in-app location such as `/courses/42?tab=syllabus`.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::NotAbsolute` unless the value starts with a single
    /// `/` (protocol-relative `//host` is rejected).
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let raw = raw.trim();
        if !raw.starts_with('/') || raw.starts_with("//") || raw.contains('\\') {
            return Err(RouteError::NotAbsolute(raw.to_owned()));
        }
        let raw = raw.split('#').next().unwrap_or(raw);
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query).filter(|q| !q.is_empty())),
            None => (raw, None),
        };
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        Ok(Self {
            path: path.to_owned(),
            query: query.map(str::to_owned),
        })
    }

    /// Landing page for a role.
    #[must_use]
    pub fn landing(role: Role) -> Self {
        Self {
            path: role.landing_path().to_owned(),
            query: None,
        }
    }

    /// `/login?next=<destination>`, so the user can be sent back after sign-in.
    #[must_use]
    pub fn login_redirect(destination: &Route) -> Self {
        let next: String =
            form_urlencoded::byte_serialize(destination.to_string().as_bytes()).collect();
        Self {
            path: LOGIN_PATH.to_owned(),
            query: Some(format!("next={next}")),
        }
    }

    /// Where to go after a successful sign-in.
    ///
    /// Honours the `next` parameter of a login route when it names an
    /// in-app path; anything else falls back to the role's landing page.
    #[must_use]
    pub fn post_login_target(login: &Route, role: Role) -> Self {
        login
            .query_param("next")
            .and_then(|next| Route::parse(&next).ok())
            .filter(|next| next.path != LOGIN_PATH)
            .unwrap_or_else(|| Route::landing(role))
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// True if this route is `prefix` or lives below it.
    #[must_use]
    pub fn is_under(&self, prefix: &str) -> bool {
        if prefix == "/" {
            return self.path == "/";
        }
        self.path == prefix
            || self
                .path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => f.write_str(&self.path),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}
