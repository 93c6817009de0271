//! `ApiClient`: base URL + gate + transport + watcher.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::auth::{AuthFailureHandler, HandlerSlot, SessionInvalidator};
use crate::session::SessionInference;

use super::ApiError;
use super::gate::RequestGate;
use super::paths::LOGOUT_PATH;
use super::transport::Transport;
use super::types::{ApiRequest, ApiResponse};
use super::watcher::ResponseWatcher;

pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    gate: RequestGate,
    watcher: ResponseWatcher,
    handlers: Arc<HandlerSlot>,
    inference: Arc<SessionInference>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>, inference: Arc<SessionInference>) -> Self {
        let handlers = Arc::new(HandlerSlot::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            transport,
            gate: RequestGate::new(Arc::clone(&inference), Arc::clone(&handlers)),
            watcher: ResponseWatcher::new(Arc::clone(&inference), Arc::clone(&handlers)),
            handlers,
            inference,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn inference(&self) -> &Arc<SessionInference> {
        &self.inference
    }

    /// Replace the handler both interceptors report auth failures to.
    pub fn set_auth_error_handler(&self, handler: Arc<dyn AuthFailureHandler>) {
        self.handlers.set(handler);
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send through the full interceptor chain.
    ///
    /// # Errors
    ///
    /// Returns the gate's, transport's, or watcher's error.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.gate.admit(&mut request).await?;
        let outcome = self.transport.send(&request).await;
        self.watcher.observe(&request, outcome).await
    }

    /// Send a JSON request to `path` and parse the JSON response.
    ///
    /// # Errors
    ///
    /// Returns any `send` error, or `ApiError::Decode` for a non-JSON body.
    pub async fn request_json(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let mut request = ApiRequest::new(method, self.url(path));
        request.body = body;
        self.send(request).await?.json()
    }

    /// # Errors
    ///
    /// See [`ApiClient::request_json`].
    pub async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.request_json(Method::GET, path, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request_json`].
    pub async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request_json(Method::POST, path, Some(body)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request_json`].
    pub async fn put_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request_json(Method::PUT, path, Some(body)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request_json`].
    pub async fn delete_json(&self, path: &str) -> Result<Value, ApiError> {
        self.request_json(Method::DELETE, path, None).await
    }
}

/// Logout's server-side call goes straight to the transport: by the time it
/// runs the session flag is already cleared, and a gate rejection or 401
/// here would re-enter logout.
#[async_trait::async_trait]
impl SessionInvalidator for ApiClient {
    async fn invalidate_session(&self) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::POST, self.url(LOGOUT_PATH));
        let response = self.transport.send(&request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: response.status,
                message: response
                    .server_message()
                    .unwrap_or_else(|| format!("HTTP {}", response.status)),
            })
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
