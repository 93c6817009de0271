//! Session flag and authentication inference.
//!
//! DESIGN
//! ======
//! The real credential is an HTTP-only cookie the client cannot inspect, so
//! "is the user logged in?" is answered by a heuristic chain:
//!
//! 1. the in-process `SessionFlag` (set only by a successful login),
//! 2. in development builds, the persisted `isAuthenticated` entry and
//!    nothing else,
//! 3. in production builds, whether any cookie is visible at all.
//!
//! The chain is permissive on purpose: a false positive is corrected by the
//! server's 401, which the response watcher turns into a logout.
//!
//! TRADE-OFFS
//! ==========
//! A fresh production process holding a valid server cookie it cannot see,
//! with no flag, is classified as logged out until a request round-trips.
//! This gap is part of the observable behavior and is kept.
//!
//! The flag has one writer (`AuthContext`) and many readers (gate, watcher),
//! so an `AtomicBool` is all the coordination it needs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::auth::persisted::IS_AUTHENTICATED_KEY;
use crate::config::BuildMode;
use crate::cookies::CookieAccess;
use crate::storage::LocalStorage;

/// In-process record of "a login succeeded in this process". Never persisted.
#[derive(Debug, Default)]
pub struct SessionFlag {
    logged_in: AtomicBool,
}

impl SessionFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_logged_in(&self, flag: bool) {
        self.logged_in.store(flag, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.logged_in.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }
}

/// Which link of the heuristic chain produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    SessionFlag,
    PersistedFlag,
    VisibleCookie,
    Nothing,
}

impl Evidence {
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Self::Nothing)
    }
}

pub struct SessionInference {
    flag: Arc<SessionFlag>,
    mode: BuildMode,
    storage: Arc<dyn LocalStorage>,
    cookies: Arc<dyn CookieAccess>,
}

impl SessionInference {
    #[must_use]
    pub fn new(
        flag: Arc<SessionFlag>,
        mode: BuildMode,
        storage: Arc<dyn LocalStorage>,
        cookies: Arc<dyn CookieAccess>,
    ) -> Self {
        Self { flag, mode, storage, cookies }
    }

    #[must_use]
    pub fn flag(&self) -> &Arc<SessionFlag> {
        &self.flag
    }

    /// Walk the heuristic chain and report which signal, if any, was found.
    #[must_use]
    pub fn evidence(&self) -> Evidence {
        if self.flag.is_set() {
            return Evidence::SessionFlag;
        }
        if self.mode.is_development() {
            return if self.storage.get_item(IS_AUTHENTICATED_KEY).as_deref() == Some("true") {
                Evidence::PersistedFlag
            } else {
                Evidence::Nothing
            };
        }
        if !self.cookies.visible_cookies().trim().is_empty() {
            return Evidence::VisibleCookie;
        }
        Evidence::Nothing
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let evidence = self.evidence();
        tracing::trace!(?evidence, "session inference");
        evidence.is_authenticated()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
