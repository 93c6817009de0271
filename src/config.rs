//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use reqwest::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DATA_DIR_NAME: &str = "fintrack";

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid FINTRACK_API_URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("unknown FINTRACK_ENV: {0}")]
    UnknownMode(String),
    #[error("no data directory available; set FINTRACK_DATA_DIR")]
    NoDataDir,
}

/// Build flavor. Development builds trust the persisted login flag when
/// inferring whether the user is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub mode: BuildMode,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `FINTRACK_API_URL`: default `http://localhost:5000/api`
    /// - `FINTRACK_ENV`: `production` (default) or `development`
    /// - `FINTRACK_DATA_DIR`: default `<platform data dir>/fintrack`
    /// - `FINTRACK_REQUEST_TIMEOUT_SECS`: default 30
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL does not parse, the mode is unknown, or
    /// no data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_api_url(std::env::var("FINTRACK_API_URL").ok().as_deref())?;
        let mode = parse_mode(std::env::var("FINTRACK_ENV").ok().as_deref())?;
        let data_dir = match std::env::var_os("FINTRACK_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join(DATA_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };
        let request_timeout_secs = std::env::var("FINTRACK_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(Self { api_url, mode, data_dir, request_timeout_secs })
    }

    /// Replace the API URL, validating it the same way `from_env` does.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` does not parse as a URL with a host.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(Some(raw))?;
        Ok(self)
    }

    /// Host component of the API URL, used to domain-qualify cookie clearing.
    #[must_use]
    pub fn api_host(&self) -> String {
        Url::parse(&self.api_url)
            .map(|url| url.host_str().unwrap_or_default().to_owned())
            .unwrap_or_default()
    }
}

pub(crate) fn parse_api_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let url = raw.unwrap_or(DEFAULT_API_URL).trim().trim_end_matches('/').to_owned();
    match Url::parse(&url) {
        Ok(parsed) if parsed.has_host() => Ok(url),
        Ok(_) => Err(ConfigError::InvalidApiUrl { url, reason: "missing host".into() }),
        Err(e) => Err(ConfigError::InvalidApiUrl { url, reason: e.to_string() }),
    }
}

pub(crate) fn parse_mode(raw: Option<&str>) -> Result<BuildMode, ConfigError> {
    match raw.map(str::trim).unwrap_or("production").to_ascii_lowercase().as_str() {
        "production" | "prod" => Ok(BuildMode::Production),
        "development" | "dev" => Ok(BuildMode::Development),
        other => Err(ConfigError::UnknownMode(other.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
