//! API error type.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::session::StorageError;

/// Errors that can occur when talking to the task manager API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the credentials (401) or the action (403).
    #[error("Unauthorized ({status}){}", fmt_message(.message.as_deref()))]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    /// The server answered with any other non-2xx status.
    #[error("API error ({status}){}", fmt_message(.message.as_deref()))]
    Request {
        status: u16,
        message: Option<String>,
    },

    /// A 2xx body could not be decoded.
    #[error("Parse error: {0}")]
    Decode(String),

    /// Input was rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// A login response carried a token or email this client cannot accept.
    #[error("Invalid profile in login response: {0}")]
    InvalidProfile(String),

    /// The session could not be persisted after a successful login.
    #[error("Session storage error: {0}")]
    Session(#[from] StorageError),
}

fn fmt_message(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// Build the error for a non-2xx response.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        let status = status.as_u16();
        if status == 401 || status == 403 {
            Self::Unauthorized { status, message }
        } else {
            Self::Request { status, message }
        }
    }

    /// HTTP status of a server-side rejection.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server refused the credentials or the action.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The message to show a user.
    ///
    /// Server-supplied and validation messages are shown verbatim; anything
    /// else collapses to `default`.
    #[must_use]
    pub fn user_message(&self, default: &str) -> String {
        match self {
            Self::Unauthorized {
                message: Some(message),
                ..
            }
            | Self::Request {
                message: Some(message),
                ..
            }
            | Self::Validation(message) => message.clone(),
            _ => default.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message` first, then `error`. Blank values count as absent.
fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    [parsed.message, parsed.error]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field_wins() {
        let body = r#"{"success":false,"message":"Username is already taken!","error":"x"}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("Username is already taken!")
        );
    }

    #[test]
    fn test_error_field_fallback() {
        let body = r#"{"error":"Access denied. Admin role required."}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("Access denied. Admin role required.")
        );
    }

    #[test]
    fn test_no_message() {
        assert_eq!(extract_message(""), None);
        assert_eq!(extract_message("<html>oops</html>"), None);
        assert_eq!(extract_message(r#"{"message":"  "}"#), None);
        assert_eq!(extract_message("[1,2]"), None);
    }

    #[test]
    fn test_status_classification() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "");
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(403));

        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(err.is_unauthorized());

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"nope"}"#);
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message("Failed"), "nope");
    }

    #[test]
    fn test_user_message_defaults() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message("Failed to delete task"), "Failed to delete task");

        let err = ApiError::Decode("bad".to_string());
        assert_eq!(err.user_message("Login failed"), "Login failed");

        let err = ApiError::Validation("Title is required".to_string());
        assert_eq!(err.user_message("Failed to create task"), "Title is required");
    }

    #[test]
    fn test_display_includes_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"nope"}"#);
        assert_eq!(err.to_string(), "API error (400): nope");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "API error (404)");
    }
}
