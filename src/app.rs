//! Application wiring.
//!
//! DESIGN
//! ======
//! `App::bootstrap` is the one place the object graph is built, in the same
//! order a page load runs: open storage and the cookie jar, derive session
//! inference, build the gated client, rehydrate the auth context from
//! storage, and only then install the auth-failure handler that needs the
//! context.

use std::sync::Arc;

use reqwest::Url;

use crate::auth::setup::install_auth_failure_handler;
use crate::auth::{AuthContext, AuthDeps, Navigator, Toaster};
use crate::config::ClientConfig;
use crate::cookies::PersistentJar;
use crate::net::{ApiClient, ApiError, HttpTransport};
use crate::session::{SessionFlag, SessionInference};
use crate::storage::{FileStorage, LocalStorage};

pub const STORAGE_FILE: &str = "storage.json";
pub const COOKIE_FILE: &str = "cookies.json";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct App {
    pub config: ClientConfig,
    pub storage: Arc<dyn LocalStorage>,
    pub cookies: Arc<PersistentJar>,
    pub inference: Arc<SessionInference>,
    pub client: Arc<ApiClient>,
    pub auth: Arc<AuthContext>,
}

impl App {
    /// # Errors
    ///
    /// Returns an error if the API URL does not parse or the HTTP client
    /// cannot be built.
    pub async fn bootstrap(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
        toaster: Arc<dyn Toaster>,
    ) -> Result<Self, AppError> {
        let api_url = Url::parse(&config.api_url).map_err(|e| AppError::InvalidUrl(e.to_string()))?;

        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(config.data_dir.join(STORAGE_FILE)));
        let cookie_storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(config.data_dir.join(COOKIE_FILE)));
        let cookies = Arc::new(PersistentJar::load(api_url, cookie_storage));

        let flag = Arc::new(SessionFlag::new());
        let inference = Arc::new(SessionInference::new(
            Arc::clone(&flag),
            config.mode,
            Arc::clone(&storage),
            cookies.clone(),
        ));

        let transport = Arc::new(HttpTransport::new(Arc::clone(&cookies), config.request_timeout_secs)?);
        let client = Arc::new(ApiClient::new(config.api_url.clone(), transport, Arc::clone(&inference)));

        let auth = AuthContext::rehydrate(AuthDeps {
            flag,
            storage: Arc::clone(&storage),
            cookies: cookies.clone(),
            invalidator: client.clone(),
            navigator,
            toaster,
            cookie_host: config.api_host(),
        })
        .await;
        install_auth_failure_handler(&client, &auth);

        tracing::debug!(api_url = %config.api_url, mode = ?config.mode, "app bootstrapped");
        Ok(Self { config, storage, cookies, inference, client, auth })
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
