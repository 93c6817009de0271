//! Client-side authentication state.
//!
//! ARCHITECTURE
//! ============
//! `AuthContext` is the single source of truth for who is logged in. It
//! writes the `SessionFlag`, owns the persisted `user`/`isAuthenticated`
//! entries, and performs logout. The HTTP layer only reads session
//! inference and reports failures through the `AuthFailureHandler` that
//! `setup::install_auth_failure_handler` wires back to `AuthContext::logout`.

pub mod context;
pub mod handler;
pub mod navigation;
pub mod persisted;
pub mod setup;
pub mod user;

pub use context::{AuthContext, AuthDeps, AuthSnapshot, AuthStatus, SessionInvalidator};
pub use handler::{AuthFailureHandler, HandlerSlot, LoggingHandler};
pub use navigation::{Navigator, Route, Toaster};
pub use user::{LoginMethod, User};

use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login requires user data")]
    MissingUserData,
    #[error("failed to persist auth state: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode user: {0}")]
    Encode(#[from] serde_json::Error),
}
