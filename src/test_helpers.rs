//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::auth::{AuthContext, AuthDeps, AuthFailureHandler, Navigator, Route, SessionInvalidator, Toaster};
use crate::config::BuildMode;
use crate::cookies::{CookieAccess, CookieError};
use crate::net::{ApiClient, ApiError, ApiRequest, ApiResponse, Transport};
use crate::session::{SessionFlag, SessionInference};
use crate::storage::{LocalStorage, MemoryStorage, StorageError};

pub const TEST_API_URL: &str = "http://localhost:5000/api";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Records every request and answers from a script, defaulting to `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    script: Mutex<VecDeque<Result<ApiResponse, String>>>,
}

impl RecordingTransport {
    pub fn respond(&self, status: u16, body: &str) {
        lock(&self.script).push_back(Ok(ApiResponse::new(status, body)));
    }

    pub fn fail(&self, reason: &str) {
        lock(&self.script).push_back(Err(reason.to_owned()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        lock(&self.requests).push(request.clone());
        match lock(&self.script).pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(ApiError::Transport(reason)),
            None => Ok(ApiResponse::new(200, "{}")),
        }
    }
}

// =============================================================================
// AUTH FAILURE HANDLER
// =============================================================================

#[derive(Default)]
pub struct RecordingHandler {
    messages: Mutex<Vec<Option<String>>>,
}

impl RecordingHandler {
    pub fn messages(&self) -> Vec<Option<String>> {
        lock(&self.messages).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.messages).len()
    }
}

#[async_trait::async_trait]
impl AuthFailureHandler for RecordingHandler {
    async fn notify_auth_failure(&self, message: Option<String>) {
        lock(&self.messages).push(message);
    }
}

// =============================================================================
// COOKIES
// =============================================================================

/// Cookie view with a settable visible string. An expiring `jwt` directive
/// clears it, like a browser jar would.
#[derive(Default)]
pub struct FakeCookies {
    visible: Mutex<String>,
    writes: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl FakeCookies {
    pub fn with_visible(cookies: &str) -> Self {
        Self { visible: Mutex::new(cookies.to_owned()), ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn set_visible(&self, cookies: &str) {
        *lock(&self.visible) = cookies.to_owned();
    }

    pub fn writes(&self) -> Vec<String> {
        lock(&self.writes).clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl CookieAccess for FakeCookies {
    fn visible_cookies(&self) -> String {
        lock(&self.visible).clone()
    }

    fn write(&self, directive: &str) -> Result<(), CookieError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CookieError::InvalidDirective(directive.to_owned()));
        }
        if directive.starts_with("jwt=;") && directive.contains("1970") {
            lock(&self.visible).clear();
        }
        lock(&self.writes).push(directive.to_owned());
        Ok(())
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Memory storage whose writes to one key always fail.
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_key: &'static str,
}

impl FlakyStorage {
    pub fn failing_writes_to(key: &'static str) -> Self {
        Self { inner: MemoryStorage::new(), fail_key: key }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if key == self.fail_key {
            return Err(StorageError::Io { path: PathBuf::from("flaky"), source: io::Error::other("disk full") });
        }
        Ok(())
    }
}

impl LocalStorage for FlakyStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.remove_item(key)
    }
}

// =============================================================================
// UI HOOKS
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }

    pub fn last(&self) -> Option<Route> {
        lock(&self.routes).last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        lock(&self.routes).push(route);
    }
}

#[derive(Default)]
pub struct RecordingToaster {
    messages: Mutex<Vec<String>>,
}

impl RecordingToaster {
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Toaster for RecordingToaster {
    fn show(&self, message: &str) {
        lock(&self.messages).push(message.to_owned());
    }
}

// =============================================================================
// SESSION INVALIDATOR
// =============================================================================

#[derive(Default)]
pub struct StubInvalidator {
    calls: AtomicUsize,
    fail: bool,
}

impl StubInvalidator {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionInvalidator for StubInvalidator {
    async fn invalidate_session(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

// =============================================================================
// HARNESS
// =============================================================================

/// One fully wired client stack over fakes.
pub struct Harness {
    pub flag: Arc<SessionFlag>,
    pub storage: Arc<MemoryStorage>,
    pub cookies: Arc<FakeCookies>,
    pub inference: Arc<SessionInference>,
    pub transport: Arc<RecordingTransport>,
    pub client: Arc<ApiClient>,
    pub handler: Arc<RecordingHandler>,
    pub navigator: Arc<RecordingNavigator>,
    pub toaster: Arc<RecordingToaster>,
    pub invalidator: Arc<StubInvalidator>,
}

impl Harness {
    pub fn new(mode: BuildMode) -> Self {
        Self::with_invalidator(mode, StubInvalidator::default())
    }

    pub fn production() -> Self {
        Self::new(BuildMode::Production)
    }

    pub fn development() -> Self {
        Self::new(BuildMode::Development)
    }

    pub fn with_invalidator(mode: BuildMode, invalidator: StubInvalidator) -> Self {
        let flag = Arc::new(SessionFlag::new());
        let storage = Arc::new(MemoryStorage::new());
        let cookies = Arc::new(FakeCookies::default());
        let inference = Arc::new(SessionInference::new(
            Arc::clone(&flag),
            mode,
            storage.clone(),
            cookies.clone(),
        ));
        let transport = Arc::new(RecordingTransport::default());
        let client = Arc::new(ApiClient::new(TEST_API_URL, transport.clone(), Arc::clone(&inference)));
        let handler = Arc::new(RecordingHandler::default());
        client.set_auth_error_handler(handler.clone());

        Self {
            flag,
            storage,
            cookies,
            inference,
            transport,
            client,
            handler,
            navigator: Arc::new(RecordingNavigator::default()),
            toaster: Arc::new(RecordingToaster::default()),
            invalidator: Arc::new(invalidator),
        }
    }

    pub fn auth_deps(&self) -> AuthDeps {
        AuthDeps {
            flag: Arc::clone(&self.flag),
            storage: self.storage.clone(),
            cookies: self.cookies.clone(),
            invalidator: self.invalidator.clone(),
            navigator: self.navigator.clone(),
            toaster: self.toaster.clone(),
            cookie_host: "localhost".into(),
        }
    }

    pub fn context(&self) -> Arc<AuthContext> {
        Arc::new(AuthContext::new(self.auth_deps()))
    }
}
