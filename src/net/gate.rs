//! Outbound interceptor: block requests locally when the user is not
//! authenticated.
//!
//! DESIGN
//! ======
//! The gate can only admit or reject; it never delays, queues, or retries.
//! Auth endpoints on the allow-list always pass so a logged-out user can
//! still log in or register. Every other request consults session
//! inference; a negative answer notifies the auth-failure handler once and
//! fails the request before it reaches the transport.

use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::auth::HandlerSlot;
use crate::session::SessionInference;

use super::ApiError;
use super::paths::AUTH_ALLOW_LIST;
use super::types::ApiRequest;

pub const NOT_AUTHENTICATED_MESSAGE: &str = "You are not authenticated. Please log in.";

const CORRELATION_SUFFIX_LEN: usize = 7;

/// `<unix millis>-<7 alphanumerics>`, for log correlation only.
#[must_use]
pub fn correlation_id() -> String {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(CORRELATION_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{millis}-{suffix}")
}

#[must_use]
pub fn is_allow_listed(url: &str) -> bool {
    AUTH_ALLOW_LIST.iter().any(|path| url.contains(path))
}

pub struct RequestGate {
    inference: Arc<SessionInference>,
    handlers: Arc<HandlerSlot>,
}

impl RequestGate {
    #[must_use]
    pub fn new(inference: Arc<SessionInference>, handlers: Arc<HandlerSlot>) -> Self {
        Self { inference, handlers }
    }

    /// Tag `request` with a correlation id and decide whether it may leave.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` when inference reports the user
    /// as logged out and the URL is not allow-listed. The handler has already
    /// been notified when this returns.
    pub async fn admit(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        let request_id = correlation_id();
        tracing::debug!(%request_id, method = %request.method, url = %request.url, "request gated");
        request.request_id = Some(request_id);

        if is_allow_listed(&request.url) || self.inference.is_authenticated() {
            return Ok(());
        }

        tracing::warn!(
            request_id = request.request_id.as_deref().unwrap_or(""),
            url = %request.url,
            "request blocked: not authenticated"
        );
        self.handlers
            .notify(Some(NOT_AUTHENTICATED_MESSAGE.to_owned()))
            .await;
        Err(ApiError::NotAuthenticated(NOT_AUTHENTICATED_MESSAGE.to_owned()))
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
