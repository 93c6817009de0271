//! Login and registration calls.
//!
//! These only talk to the server. Recording the login in `AuthContext` is
//! the caller's job, so a failed call never touches auth state.

use serde::Serialize;
use serde_json::Value;

use crate::auth::User;
use crate::net::paths::{LOGIN_PATH, REGISTER_PATH};
use crate::net::{ApiClient, ApiError};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// `POST /auth/login`. The server sets the auth cookie; a user record in the
/// body is optional.
///
/// # Errors
///
/// Returns the client's error if the request fails or is rejected.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<Option<User>, ApiError> {
    let body = client
        .post_json(LOGIN_PATH, serde_json::to_value(credentials)?)
        .await?;
    Ok(user_from_body(&body))
}

/// `POST /auth/register`.
///
/// # Errors
///
/// Returns the client's error if the request fails or is rejected.
pub async fn register(client: &ApiClient, registration: &Registration) -> Result<Option<User>, ApiError> {
    let body = client
        .post_json(REGISTER_PATH, serde_json::to_value(registration)?)
        .await?;
    Ok(user_from_body(&body))
}

/// Pull a user out of an auth response: either `{"user": {...}}` or the
/// record itself at the top level.
pub(crate) fn user_from_body(body: &Value) -> Option<User> {
    let candidate = body.get("user").unwrap_or(body);
    if !candidate.get("username").is_some_and(Value::is_string) {
        return None;
    }
    serde_json::from_value(candidate.clone()).ok()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
