//! Persisted auth state: the `user` and `isAuthenticated` storage entries.
//!
//! The flag is written after the user record and removed before it, so a
//! stored `isAuthenticated == "true"` always has a user next to it.

use crate::storage::{LocalStorage, StorageError};

use super::AuthError;
use super::user::User;

pub const USER_KEY: &str = "user";
pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";

/// Result of reading persisted auth state at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedAuth {
    /// Nothing usable stored; start logged out.
    Absent,
    /// Flag set and a parsable user present.
    Present(User),
    /// Flag set but the user record cannot be parsed.
    Malformed(String),
}

/// Write the user record, then the flag. If the flag cannot be written the
/// user record is rolled back.
///
/// # Errors
///
/// Returns an error if the user cannot be encoded or either entry cannot be
/// written.
pub fn save(storage: &dyn LocalStorage, user: &User) -> Result<(), AuthError> {
    let raw = serde_json::to_string(user)?;
    storage.set_item(USER_KEY, &raw)?;
    if let Err(e) = storage.set_item(IS_AUTHENTICATED_KEY, "true") {
        if let Err(rollback) = storage.remove_item(USER_KEY) {
            tracing::warn!(error = %rollback, "failed to roll back persisted user");
        }
        return Err(e.into());
    }
    Ok(())
}

#[must_use]
pub fn load(storage: &dyn LocalStorage) -> PersistedAuth {
    if storage.get_item(IS_AUTHENTICATED_KEY).as_deref() != Some("true") {
        return PersistedAuth::Absent;
    }
    let Some(raw) = storage.get_item(USER_KEY) else {
        tracing::debug!("persisted auth flag without user record; treating as logged out");
        return PersistedAuth::Absent;
    };
    match serde_json::from_str::<User>(&raw) {
        Ok(user) if user.username.trim().is_empty() => PersistedAuth::Malformed("empty username".into()),
        Ok(user) => PersistedAuth::Present(user),
        Err(e) => PersistedAuth::Malformed(e.to_string()),
    }
}

/// Remove both entries, flag first. Every removal is attempted; failures are
/// returned for logging.
pub fn clear(storage: &dyn LocalStorage) -> Vec<StorageError> {
    [IS_AUTHENTICATED_KEY, USER_KEY]
        .into_iter()
        .filter_map(|key| storage.remove_item(key).err())
        .collect()
}

#[cfg(test)]
#[path = "persisted_test.rs"]
mod tests;
