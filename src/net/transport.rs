//! Transport seam between the interceptors and the network.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::CookieStore;

use super::ApiError;
use super::types::{ApiRequest, ApiResponse};

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Sends one request and returns whatever status the server answered with.
/// Non-success statuses are responses, not errors, at this level.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport. Every request carries the cookie jar.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the reqwest client cannot be built.
    pub fn new<C>(cookies: Arc<C>, request_timeout_secs: u64) -> Result<Self, ApiError>
    where
        C: CookieStore + 'static,
    {
        let http = reqwest::Client::builder()
            .cookie_provider(cookies)
            .timeout(Duration::from_secs(request_timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self.http.request(request.method.clone(), &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        tracing::debug!(
            request_id = request.request_id.as_deref().unwrap_or(""),
            method = %request.method,
            url = %request.url,
            status,
            "response received"
        );
        Ok(ApiResponse { status, body })
    }
}
