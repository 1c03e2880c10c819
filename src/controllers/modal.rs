//! Modal controller — the name prompt shown by the session gate.
//!
//! The modal owns the request's cookie jar and hands it back with every
//! outcome so the route can attach the resulting `Set-Cookie` headers.

use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::services::session::{identity_cookie, removal_cookie};

/// How the modal was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalOutcome {
    /// Closed by an action (submit or remove).
    Closed,
    /// Dismissed without persisting anything.
    Dismissed,
}

pub struct ModalController {
    jar: CookieJar,
    secure: bool,
}

impl ModalController {
    #[must_use]
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    /// Persist `name` as the session identity. Accepted as-is.
    #[must_use]
    pub fn submit(self, name: &str) -> (CookieJar, ModalOutcome) {
        (self.jar.add(identity_cookie(name, self.secure)), ModalOutcome::Closed)
    }

    /// Forget the persisted identity.
    #[must_use]
    pub fn remove(self) -> (CookieJar, ModalOutcome) {
        (self.jar.remove(removal_cookie()), ModalOutcome::Closed)
    }

    #[must_use]
    pub fn cancel(self) -> (CookieJar, ModalOutcome) {
        (self.jar, ModalOutcome::Dismissed)
    }
}
