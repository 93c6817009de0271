//! Wiring step connecting the HTTP interceptors to `AuthContext::logout`.

use std::sync::{Arc, Weak};

use crate::net::ApiClient;

use super::context::AuthContext;
use super::handler::AuthFailureHandler;

/// Logs the user out whenever an interceptor reports an auth failure.
///
/// The context owns the client as its session invalidator, so this side
/// holds only a `Weak`.
pub struct LogoutOnAuthFailure {
    context: Weak<AuthContext>,
}

impl LogoutOnAuthFailure {
    #[must_use]
    pub fn new(context: &Arc<AuthContext>) -> Self {
        Self { context: Arc::downgrade(context) }
    }
}

#[async_trait::async_trait]
impl AuthFailureHandler for LogoutOnAuthFailure {
    async fn notify_auth_failure(&self, message: Option<String>) {
        match self.context.upgrade() {
            Some(context) => context.logout(message.as_deref()).await,
            None => tracing::debug!("auth failure after auth context was dropped"),
        }
    }
}

/// Register the logout handler on `client`. Run once, after the auth
/// context exists.
pub fn install_auth_failure_handler(client: &ApiClient, context: &Arc<AuthContext>) {
    client.set_auth_error_handler(Arc::new(LogoutOnAuthFailure::new(context)));
    tracing::debug!("auth failure handler installed");
}
