//! `AuthContext`: login/logout state machine shared across the app.
//!
//! DESIGN
//! ======
//! Two states, `LoggedOut` (initial) and `LoggedIn`.
//!
//! - `login` requires user data; without it nothing changes and the caller
//!   gets `AuthError::MissingUserData`.
//! - `logout` never fails. Each step (flag reset, server invalidation,
//!   storage removal, cookie expiry, state reset, toast, navigation) is
//!   guarded on its own and a failure in one never skips the rest.
//! - `rehydrate` restores `LoggedIn` from persisted state without a network
//!   call; a corrupt persisted user forces a logout.
//!
//! The in-memory snapshot sits behind a std `RwLock` that is never held
//! across an `.await`.

use std::sync::{Arc, PoisonError, RwLock};

use crate::cookies::{AUTH_COOKIE_NAME, CookieAccess, expire_cookie};
use crate::net::ApiError;
use crate::session::SessionFlag;
use crate::storage::LocalStorage;

use super::AuthError;
use super::navigation::{Navigator, Route, Toaster};
use super::persisted::{self, PersistedAuth};
use super::user::{LoginMethod, User};

pub const AUTH_ERROR_MESSAGE: &str = "Authentication error. Please log in again.";

/// Server-side session invalidation, called best-effort during logout.
#[async_trait::async_trait]
pub trait SessionInvalidator: Send + Sync {
    async fn invalidate_session(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    LoggedOut,
    LoggedIn,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthSnapshot {
    pub status: AuthStatus,
    pub user: Option<User>,
}

impl AuthSnapshot {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::LoggedIn
    }
}

/// Everything `AuthContext` talks to, injected at wiring time.
pub struct AuthDeps {
    pub flag: Arc<SessionFlag>,
    pub storage: Arc<dyn LocalStorage>,
    pub cookies: Arc<dyn CookieAccess>,
    pub invalidator: Arc<dyn SessionInvalidator>,
    pub navigator: Arc<dyn Navigator>,
    pub toaster: Arc<dyn Toaster>,
    /// Host used for the domain-qualified cookie clearing variant.
    pub cookie_host: String,
}

pub struct AuthContext {
    deps: AuthDeps,
    state: RwLock<AuthSnapshot>,
}

impl AuthContext {
    /// Fresh context in `LoggedOut`, ignoring anything persisted.
    #[must_use]
    pub fn new(deps: AuthDeps) -> Self {
        Self { deps, state: RwLock::new(AuthSnapshot::default()) }
    }

    /// Build a context from persisted state, as on application start.
    pub async fn rehydrate(deps: AuthDeps) -> Arc<Self> {
        let context = Arc::new(Self::new(deps));
        match persisted::load(context.deps.storage.as_ref()) {
            PersistedAuth::Present(user) => {
                tracing::info!(username = %user.username, "restored persisted login");
                context.set_state(AuthSnapshot { status: AuthStatus::LoggedIn, user: Some(user) });
            }
            PersistedAuth::Absent => tracing::debug!("no persisted login"),
            PersistedAuth::Malformed(reason) => {
                tracing::error!(%reason, "persisted user is malformed; forcing logout");
                context.logout(Some(AUTH_ERROR_MESSAGE)).await;
            }
        }
        context
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.snapshot().user
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.state.read().unwrap_or_else(PoisonError::into_inner).status
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::LoggedIn
    }

    fn set_state(&self, snapshot: AuthSnapshot) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Transition to `LoggedIn` after the server accepted a login.
    ///
    /// # Errors
    ///
    /// Returns `MissingUserData` when `user_data` is `None`, or a storage
    /// error when the login cannot be persisted. State is unchanged on error.
    pub fn login(&self, method: LoginMethod, user_data: Option<User>) -> Result<(), AuthError> {
        let Some(user) = user_data else {
            tracing::warn!(method = method.as_str(), "login rejected: no user data");
            return Err(AuthError::MissingUserData);
        };

        persisted::save(self.deps.storage.as_ref(), &user)?;
        self.deps.flag.set_logged_in(true);
        tracing::info!(method = method.as_str(), username = %user.username, "login succeeded");
        self.set_state(AuthSnapshot { status: AuthStatus::LoggedIn, user: Some(user) });
        Ok(())
    }

    /// Transition to `LoggedOut`. Always completes and always navigates to
    /// the login route.
    pub async fn logout(&self, message: Option<&str>) {
        let username = self.user().map(|u| u.username);
        tracing::info!(username = username.as_deref().unwrap_or(""), "logging out");

        self.deps.flag.reset();

        if let Err(e) = self.deps.invalidator.invalidate_session().await {
            tracing::warn!(error = %e, "server session invalidation failed; continuing logout");
        }

        for e in persisted::clear(self.deps.storage.as_ref()) {
            tracing::warn!(error = %e, "failed to clear persisted auth state");
        }

        expire_cookie(self.deps.cookies.as_ref(), AUTH_COOKIE_NAME, &self.deps.cookie_host);

        self.set_state(AuthSnapshot::default());

        if let Some(message) = message {
            self.deps.toaster.show(message);
        }

        self.deps.navigator.navigate(Route::Login);
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
