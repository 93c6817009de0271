//! Auth-failure handler registration.
//!
//! DESIGN
//! ======
//! The HTTP interceptors have no access to UI state, so they report auth
//! problems through one replaceable `AuthFailureHandler`. The slot holds
//! exactly one handler; registering a new one replaces the old one. Until
//! the app wires in a real handler, `LoggingHandler` only logs.

use std::sync::{Arc, PoisonError, RwLock};

/// One-method capability invoked by the request gate and the response
/// watcher whenever they detect an authentication problem.
#[async_trait::async_trait]
pub trait AuthFailureHandler: Send + Sync {
    async fn notify_auth_failure(&self, message: Option<String>);
}

/// Default handler: logs, never logs out.
#[derive(Debug, Default)]
pub struct LoggingHandler;

#[async_trait::async_trait]
impl AuthFailureHandler for LoggingHandler {
    async fn notify_auth_failure(&self, message: Option<String>) {
        tracing::warn!(message = message.as_deref().unwrap_or(""), "auth failure with no handler registered");
    }
}

pub struct HandlerSlot {
    current: RwLock<Arc<dyn AuthFailureHandler>>,
}

impl Default for HandlerSlot {
    fn default() -> Self {
        Self { current: RwLock::new(Arc::new(LoggingHandler)) }
    }
}

impl HandlerSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered handler. Last registration wins.
    pub fn set(&self, handler: Arc<dyn AuthFailureHandler>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    #[must_use]
    pub fn current(&self) -> Arc<dyn AuthFailureHandler> {
        Arc::clone(&*self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Invoke the current handler once. The lock is released before the
    /// handler runs so it may re-register.
    pub async fn notify(&self, message: Option<String>) {
        let handler = self.current();
        handler.notify_auth_failure(message).await;
    }
}

#[cfg(test)]
#[path = "handler_test.rs"]
mod tests;
