//! Session identity — the self-declared display name kept in a cookie.
//!
//! ARCHITECTURE
//! ============
//! There is no server-side session table. The browser holds one cookie,
//! `binChatCurrentUser`, and every request carries it. Handlers extract a
//! `SessionIdentity` and pass it explicitly to whatever needs a sender name.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie key holding the display name.
pub const USER_COOKIE: &str = "binChatCurrentUser";

/// Sender name used when no identity has been chosen.
pub const UNKNOWN_USER: &str = "unknown user";

/// Value older clients store to mean "no name yet".
pub const BLANK_PLACEHOLDER: &str = " ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    user_name: Option<String>,
}

impl SessionIdentity {
    #[must_use]
    pub fn new(user_name: Option<String>) -> Self {
        Self { user_name }
    }

    #[cfg(test)]
    #[must_use]
    pub fn named(user_name: impl Into<String>) -> Self {
        Self { user_name: Some(user_name.into()) }
    }

    #[cfg(test)]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self::new(jar.get(USER_COOKIE).map(|c| c.value().to_owned()))
    }

    /// The raw persisted value, if any.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Display name for outgoing messages. Falls back to `"unknown user"`
    /// when nothing (or an empty string) is persisted.
    #[must_use]
    pub fn get_user(&self) -> &str {
        match self.user_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN_USER,
        }
    }

    /// Whether the page must block behind the name prompt.
    #[must_use]
    pub fn needs_prompt(&self) -> bool {
        match self.user_name.as_deref() {
            None => true,
            Some(name) => name.is_empty() || name == BLANK_PLACEHOLDER,
        }
    }
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_jar(&CookieJar::from_headers(&parts.headers)))
    }
}

/// Build the identity cookie. Not `HttpOnly`: the page script reads it.
#[must_use]
pub fn identity_cookie(user_name: impl Into<String>, secure: bool) -> Cookie<'static> {
    Cookie::build((USER_COOKIE, user_name.into()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie matching `identity_cookie` for removal.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((USER_COOKIE, "")).path("/").build()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
