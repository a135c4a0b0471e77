use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Storage slot for sessions obtained through the user authenticate endpoint
pub const USER_SESSION_KEY: &str = "api_session";

/// Storage slot for anonymous sessions
pub const PUBLIC_SESSION_KEY: &str = "public_api_session";

/// Seconds before the server-declared expiry at which a session stops being reused.
/// Covers request latency so a token never expires in flight.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Which identity a token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    User,
    Public,
}

impl SessionKind {
    /// Pick the kind from the "user is logged in" signal of the host application
    pub fn for_user(has_user: bool) -> Self {
        if has_user {
            SessionKind::User
        } else {
            SessionKind::Public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::User => "user",
            SessionKind::Public => "public",
        }
    }

    /// Key under which sessions of this kind are persisted
    pub fn storage_key(&self) -> &'static str {
        match self {
            SessionKind::User => USER_SESSION_KEY,
            SessionKind::Public => PUBLIC_SESSION_KEY,
        }
    }

    /// API path (relative to `/api/v2/`) that issues sessions of this kind
    pub fn authenticate_path(&self) -> &'static str {
        match self {
            SessionKind::User => "authenticate/user",
            SessionKind::Public => "authenticate",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached bearer credential.
///
/// The serialized form matches the body of the authenticate endpoints, so a
/// response can be stored verbatim and read back later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub kind: SessionKind,
    #[serde(rename = "session")]
    pub token: String,
    #[serde(rename = "expires")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(kind: SessionKind, token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            token: token.into(),
            expires_at,
        }
    }

    /// True once `now` is within the safety margin of the declared expiry
    pub fn expires_soon_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + Duration::seconds(EXPIRY_MARGIN_SECS)
    }

    /// Check if the session must be replaced before its next use
    pub fn needs_refresh(&self) -> bool {
        self.expires_soon_at(Utc::now())
    }

    /// Serialize for a storage slot
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a stored slot value
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(SessionKind::for_user(true), SessionKind::User);
        assert_eq!(SessionKind::for_user(false), SessionKind::Public);
        assert_eq!(SessionKind::User.storage_key(), "api_session");
        assert_eq!(SessionKind::Public.storage_key(), "public_api_session");
        assert_eq!(SessionKind::User.authenticate_path(), "authenticate/user");
        assert_eq!(SessionKind::Public.authenticate_path(), "authenticate");
    }

    #[test]
    fn test_expiry_margin() {
        let now = Utc::now();
        let fresh = Session::new(SessionKind::User, "abc", now + Duration::seconds(120));
        assert!(!fresh.expires_soon_at(now));

        let inside_margin = Session::new(SessionKind::User, "abc", now + Duration::seconds(30));
        assert!(inside_margin.expires_soon_at(now));

        // Exactly at the threshold counts as expiring
        let boundary = Session::new(SessionKind::User, "abc", now + Duration::seconds(60));
        assert!(boundary.expires_soon_at(now));

        let expired = Session::new(SessionKind::User, "abc", now - Duration::seconds(5));
        assert!(expired.expires_soon_at(now));
        assert!(expired.needs_refresh());
    }

    #[test]
    fn test_parse_authenticate_body() {
        let json = r#"{"type":"public","session":"f00d","expires":"2030-01-01T12:00:00Z"}"#;
        let session = Session::from_json(json).expect("Failed to parse session JSON");
        assert_eq!(session.kind, SessionKind::Public);
        assert_eq!(session.token, "f00d");
        assert_eq!(session.expires_at.to_rfc3339(), "2030-01-01T12:00:00+00:00");

        let stored = session.to_json().expect("Failed to serialize session");
        assert_eq!(Session::from_json(&stored).expect("Failed to reparse"), session);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let json = r#"{"type":"dev","session":"f00d","expires":"2030-01-01T12:00:00Z"}"#;
        assert!(Session::from_json(json).is_err());
    }
}
