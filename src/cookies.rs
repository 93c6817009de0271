//! Cookie access for session inference and best-effort cookie clearing.
//!
//! ARCHITECTURE
//! ============
//! The server owns the `jwt` cookie and its attributes. The client only
//! needs two things from the jar: the `document.cookie` view (live cookies
//! minus `HttpOnly` ones) for the inference heuristic, and a way to push
//! expiring `Set-Cookie` directives on logout. `CookieAccess` is that narrow
//! surface.
//!
//! `PersistentJar` plugs into reqwest as its `CookieStore`, delegating to a
//! reqwest `Jar` and mirroring every accepted `Set-Cookie` line into local
//! storage so a later process replays the same jar. Mirrored lines are keyed
//! by name, domain and path. A `Max-Age` is pinned to an absolute `Expires`
//! when recorded so a reload cannot extend a cookie's life.
//!
//! TRADE-OFFS
//! ==========
//! Clearing cannot know which `Domain`/`Secure`/`SameSite` attributes the
//! server used, so every variant in [`CLEAR_VARIANTS`] is applied and none of
//! them is verified.

use std::sync::{Arc, Mutex, PoisonError};

use cookie::Cookie;
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::storage::LocalStorage;

/// Name of the server-set auth cookie.
pub const AUTH_COOKIE_NAME: &str = "jwt";

/// Storage key holding the mirrored `Set-Cookie` lines.
pub const COOKIE_STORAGE_KEY: &str = "cookies";

const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("invalid cookie directive: {0}")]
    InvalidDirective(String),
    #[error("cookie persistence failed: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// The slice of a cookie jar the auth layer is allowed to see.
pub trait CookieAccess: Send + Sync {
    /// Cookies script code could read for the API origin, `document.cookie`
    /// style. `HttpOnly` cookies never appear. Empty when none.
    fn visible_cookies(&self) -> String;

    /// Apply a raw `Set-Cookie` directive.
    ///
    /// # Errors
    ///
    /// Returns an error if the directive has no cookie name or cannot be
    /// persisted.
    fn write(&self, directive: &str) -> Result<(), CookieError>;
}

// =============================================================================
// CLEARING VARIANTS
// =============================================================================

/// One attribute combination used to expire a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearVariant {
    Plain,
    HostDomain,
    SecureCrossSite,
}

/// Applied in order on every logout.
pub const CLEAR_VARIANTS: [ClearVariant; 3] =
    [ClearVariant::Plain, ClearVariant::HostDomain, ClearVariant::SecureCrossSite];

impl ClearVariant {
    #[must_use]
    pub fn directive(self, name: &str, host: &str) -> String {
        let plain = format!("{name}=; Expires={EXPIRED_DATE}; Path=/");
        match self {
            Self::Plain => plain,
            Self::HostDomain => format!("{plain}; Domain={host}"),
            Self::SecureCrossSite => format!("{plain}; Secure; SameSite=None"),
        }
    }
}

/// Expire `name` with every clearing variant. Failures are logged and never
/// stop the remaining variants. Returns how many variants were applied.
pub fn expire_cookie(cookies: &dyn CookieAccess, name: &str, host: &str) -> usize {
    let mut applied = 0;
    for variant in CLEAR_VARIANTS {
        match cookies.write(&variant.directive(name, host)) {
            Ok(()) => applied += 1,
            Err(e) => tracing::warn!(cookie = name, ?variant, error = %e, "cookie clear attempt failed"),
        }
    }
    applied
}

fn cookie_name(line: &str) -> Option<&str> {
    let pair = line.split(';').next()?;
    let (name, _) = pair.split_once('=')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

// =============================================================================
// PERSISTENT JAR
// =============================================================================

/// One mirrored `Set-Cookie` line plus the attributes needed to key,
/// expire and filter it without reparsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredCookie {
    url: String,
    /// The directive with any `Max-Age` rewritten as an absolute `Expires`.
    line: String,
    name: String,
    domain: String,
    path: String,
    #[serde(default)]
    http_only: bool,
    /// Unix seconds. `None` for session cookies.
    #[serde(default)]
    expires_at: Option<i64>,
}

impl StoredCookie {
    fn parse(directive: &str, url: &Url, now: OffsetDateTime) -> Result<Self, CookieError> {
        let invalid = || CookieError::InvalidDirective(directive.to_owned());
        cookie_name(directive).ok_or_else(invalid)?;
        let mut cookie = Cookie::parse(directive).map_err(|_| invalid())?;

        if let Some(expires) = cookie.max_age().and_then(|max_age| now.checked_add(max_age)) {
            cookie.set_max_age(None::<Duration>);
            cookie.set_expires(expires);
        }

        let domain = match cookie.domain() {
            Some(domain) => domain.to_ascii_lowercase(),
            None => url.host_str().unwrap_or_default().to_ascii_lowercase(),
        };
        let path = cookie.path().map_or_else(|| default_path(url), str::to_owned);

        Ok(Self {
            url: url.to_string(),
            line: cookie.to_string(),
            name: cookie.name().to_owned(),
            domain,
            path,
            http_only: cookie.http_only().unwrap_or(false),
            expires_at: cookie.expires_datetime().map(OffsetDateTime::unix_timestamp),
        })
    }

    fn same_slot(&self, other: &Self) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now.unix_timestamp())
    }

    fn replay_into(&self, jar: &Jar) {
        match Url::parse(&self.url) {
            Ok(url) => jar.add_cookie_str(&self.line, &url),
            Err(e) => tracing::debug!(url = %self.url, error = %e, "skipping persisted cookie"),
        }
    }
}

/// Default cookie path for a response from `url`: the request path up to,
/// not including, its last `/`.
fn default_path(url: &Url) -> String {
    match url.path().rfind('/') {
        Some(0) | None => "/".to_owned(),
        Some(idx) => url.path()[..idx].to_owned(),
    }
}

/// reqwest cookie store whose contents survive the process.
pub struct PersistentJar {
    jar: Jar,
    api_url: Url,
    storage: Arc<dyn LocalStorage>,
    lines: Mutex<Vec<StoredCookie>>,
}

impl PersistentJar {
    /// Rebuild the jar from lines previously mirrored into `storage`,
    /// dropping any that have expired since.
    #[must_use]
    pub fn load(api_url: Url, storage: Arc<dyn LocalStorage>) -> Self {
        let mut lines: Vec<StoredCookie> = match storage.get_item(COOKIE_STORAGE_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable persisted cookies");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let now = OffsetDateTime::now_utc();
        let before = lines.len();
        lines.retain(|stored| !stored.is_expired(now));

        let jar = Jar::default();
        for stored in &lines {
            stored.replay_into(&jar);
        }
        tracing::debug!(count = lines.len(), expired = before - lines.len(), "cookie jar loaded");

        Self { jar, api_url, storage, lines: Mutex::new(lines) }
    }

    fn record(&self, line: &str, url: &Url) -> Result<(), CookieError> {
        let now = OffsetDateTime::now_utc();
        let stored = StoredCookie::parse(line, url, now)?;
        let raw = {
            let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
            lines.retain(|kept| !kept.same_slot(&stored) && !kept.is_expired(now));
            if !stored.is_expired(now) {
                lines.push(stored);
            }
            serde_json::to_string(&*lines).map_err(crate::storage::StorageError::from)?
        };
        self.storage.set_item(COOKIE_STORAGE_KEY, &raw)?;
        Ok(())
    }
}

impl CookieStore for PersistentJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            let Ok(line) = header.to_str() else {
                tracing::debug!("ignoring non-ascii set-cookie header");
                continue;
            };
            self.jar.add_cookie_str(line, url);
            if let Err(e) = self.record(line, url) {
                tracing::warn!(error = %e, "failed to persist cookie");
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}

impl CookieAccess for PersistentJar {
    /// Live cookies for the API URL minus `HttpOnly` ones, which the
    /// request path still sends.
    fn visible_cookies(&self) -> String {
        let now = OffsetDateTime::now_utc();
        let script_view = Jar::default();
        for stored in self
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|stored| !stored.http_only && !stored.is_expired(now))
        {
            stored.replay_into(&script_view);
        }
        script_view
            .cookies(&self.api_url)
            .and_then(|value| value.to_str().map(str::to_owned).ok())
            .unwrap_or_default()
    }

    fn write(&self, directive: &str) -> Result<(), CookieError> {
        if cookie_name(directive).is_none() {
            return Err(CookieError::InvalidDirective(directive.to_owned()));
        }
        self.jar.add_cookie_str(directive, &self.api_url);
        self.record(directive, &self.api_url)
    }
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
