//! HTTP layer: transport, interceptors, and the API client that chains them.
//!
//! ARCHITECTURE
//! ============
//! ```text
//! ApiClient::send
//!   -> RequestGate::admit      (may reject locally, never reaches transport)
//!   -> Transport::send         (reqwest with a persistent cookie jar)
//!   -> ResponseWatcher::observe (401 -> auth-failure handler)
//! ```
//! Both interceptors share one `HandlerSlot` and one `SessionInference`.

pub mod client;
pub mod gate;
pub mod paths;
pub mod transport;
pub mod types;
pub mod watcher;

pub use client::ApiClient;
pub use gate::RequestGate;
pub use transport::{HttpTransport, Transport};
pub use types::{ApiRequest, ApiResponse};
pub use watcher::ResponseWatcher;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Blocked before transmission because the user is not authenticated.
    #[error("{0}")]
    NotAuthenticated(String),

    /// Server answered 401.
    #[error("{message}")]
    Unauthorized { message: String },

    /// Any other non-success status.
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The response body was not the JSON we expected.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response body parsed but had the wrong shape.
    #[error("unexpected response body: {0}")]
    UnexpectedBody(&'static str),
}
