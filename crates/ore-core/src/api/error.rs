use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::{SessionKind, StoreError};

/// Error code the API returns once a session is past its expiry
pub const SESSION_EXPIRED: &str = "Api session expired";

/// Error code the API returns for an unknown or revoked session
pub const INVALID_SESSION: &str = "Invalid session";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session rejected by server: {0}")]
    SessionInvalidated(String),

    #[error("Expected {expected} session from {expected} authentication, got {actual}")]
    SessionKindMismatch { expected: SessionKind, actual: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session storage failed: {0}")]
    Storage(#[from] StoreError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Structured error payload of the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Classify a non-success response.
    ///
    /// The `error` field of a JSON body takes precedence over the raw body,
    /// and the two session error codes map to `SessionInvalidated` whatever
    /// the status code.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => {
                if parsed.error == SESSION_EXPIRED || parsed.error == INVALID_SESSION {
                    return ApiError::SessionInvalidated(parsed.error);
                }
                parsed.error
            }
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            Err(_) => Self::truncate_body(body),
        };

        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Status {
                status: code,
                message,
            },
        }
    }

    /// True for the errors that warrant dropping the cached session and retrying
    pub fn is_session_invalidation(&self) -> bool {
        matches!(self, ApiError::SessionInvalidated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_codes_are_invalidations() {
        let expired = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"error":"Api session expired"}"#);
        assert!(expired.is_session_invalidation());

        let invalid = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"Invalid session"}"#);
        assert!(invalid.is_session_invalidation());

        // Close but not exact
        let other = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"error":"invalid session"}"#);
        assert!(!other.is_session_invalidation());
        assert!(matches!(other, ApiError::Unauthorized(ref m) if m == "invalid session"));
    }

    #[test]
    fn test_status_classes() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"No such project"}"#),
            ApiError::NotFound(ref m) if m == "No such project"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(ref m) if m == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(ref m) if m == "Bad Gateway"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "taken"),
            ApiError::Status { status: 409, ref message } if message == "taken"
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
