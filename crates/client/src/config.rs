//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TASKMANAGER_API_URL` - Base URL of the REST API (default: `http://localhost:8080/api`)
//! - `TASKMANAGER_SESSION_FILE` - Where the session token is persisted
//!   (default: `<config dir>/taskmanager/session.json`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

const API_URL_VAR: &str = "TASKMANAGER_API_URL";
const SESSION_FILE_VAR: &str = "TASKMANAGER_SESSION_FILE";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Could not determine a configuration directory; set TASKMANAGER_SESSION_FILE")]
    NoConfigDir,
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every API path is appended to. Always ends with `/`.
    pub api_url: Url,
    /// Path of the durable session file.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API URL does not parse or no session
    /// file location can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default(API_URL_VAR, DEFAULT_API_URL))?;
        let session_file = match get_optional_env(SESSION_FILE_VAR) {
            Some(path) => PathBuf::from(path),
            None => default_session_file()?,
        };

        Ok(Self {
            api_url,
            session_file,
        })
    }

    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute
    /// http(s) URL.
    pub fn new(api_url: &str, session_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            session_file: session_file.into(),
        })
    }
}

/// Parse the API base URL, normalizing it to end in `/` so that relative
/// joins append instead of replacing the last path segment.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(API_URL_VAR.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            API_URL_VAR.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn default_session_file() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("taskmanager").join("session.json"))
        .ok_or(ConfigError::NoConfigDir)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let url = parse_api_url("http://localhost:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
        assert_eq!(url.join("tasks").unwrap().as_str(), "http://localhost:8080/api/tasks");
    }

    #[test]
    fn test_api_url_keeps_existing_slash() {
        let url = parse_api_url("https://tasks.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://tasks.example.com/api/");
    }

    #[test]
    fn test_api_url_rejects_relative() {
        let result = parse_api_url("/api");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_api_url_rejects_other_schemes() {
        let result = parse_api_url("ftp://example.com/api");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_new_uses_given_session_file() {
        let config = ClientConfig::new(DEFAULT_API_URL, "/tmp/session.json").unwrap();
        assert_eq!(config.session_file, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/api/");
    }
}
