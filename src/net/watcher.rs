//! Inbound interceptor: turn a 401 into exactly one auth-failure
//! notification.

use std::sync::Arc;

use crate::auth::HandlerSlot;
use crate::session::SessionInference;

use super::ApiError;
use super::types::{ApiRequest, ApiResponse};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please log in again.";

const UNAUTHORIZED: u16 = 401;

pub struct ResponseWatcher {
    inference: Arc<SessionInference>,
    handlers: Arc<HandlerSlot>,
}

impl ResponseWatcher {
    #[must_use]
    pub fn new(inference: Arc<SessionInference>, handlers: Arc<HandlerSlot>) -> Self {
        Self { inference, handlers }
    }

    /// Message reported for a 401: the server's own `message` if it sent
    /// one, else a default picked by whether we still believed we were
    /// logged in.
    #[must_use]
    pub fn unauthorized_message(&self, response: &ApiResponse) -> String {
        if let Some(message) = response.server_message() {
            return message;
        }
        if self.inference.is_authenticated() {
            SESSION_EXPIRED_MESSAGE.to_owned()
        } else {
            AUTH_FAILED_MESSAGE.to_owned()
        }
    }

    /// Inspect one transport outcome.
    ///
    /// # Errors
    ///
    /// Transport errors pass through untouched. A 401 becomes
    /// `ApiError::Unauthorized` after notifying the handler; other
    /// non-success statuses become `ApiError::Status`.
    pub async fn observe(
        &self,
        request: &ApiRequest,
        outcome: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        let response = outcome?;
        if response.is_success() {
            return Ok(response);
        }

        if response.status == UNAUTHORIZED {
            let message = self.unauthorized_message(&response);
            tracing::warn!(
                request_id = request.request_id.as_deref().unwrap_or(""),
                url = %request.url,
                %message,
                "server rejected authentication"
            );
            self.handlers.notify(Some(message.clone())).await;
            return Err(ApiError::Unauthorized { message });
        }

        let message = response
            .server_message()
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        Err(ApiError::Status { status: response.status, message })
    }
}

#[cfg(test)]
#[path = "watcher_test.rs"]
mod tests;
