//! Session-aware client for the Ore v2 REST API.
//!
//! Every call goes through `ApiClient::request`, which obtains a bearer
//! session (from the store, or from the authenticate endpoints), sends the
//! request, and on a session-invalidation error drops the cached session and
//! tries once more with a fresh one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{Session, SessionKind, SessionStore};

use super::transport::{FormData, HttpRequest, HttpResponse, Payload, ReqwestTransport, Transport};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Prefix of every API path
const API_PREFIX: &str = "api/v2";

/// Upper bound on sends per `request` call: the original attempt plus one
/// retry after a session-invalidation error.
const MAX_ATTEMPTS: u32 = 2;

/// Header carrying the anti-forgery token of the hosting page
const CSRF_HEADER: &str = "csrf-token";

/// How the session token is presented in the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `OreApi session=<token>`
    #[default]
    OreApi,
    /// Legacy `ApiSession <token>`
    ApiSession,
}

impl AuthScheme {
    pub fn header_value(&self, token: &str) -> String {
        match self {
            AuthScheme::OreApi => format!("OreApi session={}", token),
            AuthScheme::ApiSession => format!("ApiSession {}", token),
        }
    }
}

/// Explicit replacement for the page-level globals the client depends on.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Site root, e.g. `https://ore.spongepowered.org`
    pub base_url: String,
    /// Whether a user principal is active; selects user vs public sessions
    pub has_user: bool,
    pub auth_scheme: AuthScheme,
    pub csrf_token: Option<String>,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            has_user: false,
            auth_scheme: AuthScheme::default(),
            csrf_token: None,
        }
    }

    pub fn has_user(mut self, has_user: bool) -> Self {
        self.has_user = has_user;
        self
    }

    pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }

    pub fn csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    /// JSON body for POST/PUT/PATCH; query parameters for other methods
    Json(Value),
    /// Multipart body, sent as-is
    Form(FormData),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::Form(form)
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "type")]
    kind: String,
    session: String,
    expires: DateTime<Utc>,
}

/// One refresh lock per session kind
#[derive(Default)]
struct RefreshLocks {
    user: Mutex<()>,
    public: Mutex<()>,
}

impl RefreshLocks {
    fn for_kind(&self, kind: SessionKind) -> &Mutex<()> {
        match kind {
            SessionKind::User => &self.user,
            SessionKind::Public => &self.public,
        }
    }
}

/// API client for Ore.
/// Clone is cheap - transport, store and refresh locks are shared.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    options: Arc<ClientOptions>,
    refresh_locks: Arc<RefreshLocks>,
}

impl ApiClient {
    /// Create a client talking HTTP through reqwest
    pub fn new(options: ClientOptions, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(options, store, transport))
    }

    pub fn with_transport(
        options: ClientOptions,
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            store,
            options: Arc::new(options),
            refresh_locks: Arc::new(RefreshLocks::default()),
        }
    }

    /// Create a client for the other identity, sharing transport, store and locks.
    pub fn with_user(&self, has_user: bool) -> Self {
        let options = ClientOptions {
            has_user,
            ..(*self.options).clone()
        };
        Self {
            transport: Arc::clone(&self.transport),
            store: Arc::clone(&self.store),
            options: Arc::new(options),
            refresh_locks: Arc::clone(&self.refresh_locks),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Kind of session every call of this client uses
    pub fn session_kind(&self) -> SessionKind {
        SessionKind::for_user(self.options.has_user)
    }

    // ===== Sessions =====

    /// Return a token that stays valid for at least the expiry margin.
    ///
    /// Uses the cached session when possible. Otherwise authenticates,
    /// checks the kind of the new session and stores it. Concurrent callers
    /// needing a refresh wait on the same lock and reuse its result.
    pub async fn get_session(&self) -> Result<String, ApiError> {
        let kind = self.session_kind();
        if let Some(session) = self.cached_session(kind)? {
            return Ok(session.token);
        }

        let _guard = self.refresh_locks.for_kind(kind).lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(session) = self.cached_session(kind)? {
            return Ok(session.token);
        }

        let session = self.authenticate(kind).await?;
        let serialized = session
            .to_json()
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to serialize session: {}", e)))?;
        self.store.save(kind.storage_key(), &serialized)?;
        info!(kind = %kind, expires = %session.expires_at, "New API session stored");

        Ok(session.token)
    }

    /// Drop the cached session of the current kind. No-op if none is stored.
    pub fn invalidate_session(&self) -> Result<(), ApiError> {
        let kind = self.session_kind();
        self.store.remove(kind.storage_key())?;
        debug!(kind = %kind, "API session invalidated");
        Ok(())
    }

    /// Drop the cached session if it still holds the rejected `token`.
    ///
    /// Runs under the refresh lock, so a session stored meanwhile by another
    /// caller is kept and reused by the retry.
    async fn invalidate_if_current(&self, token: &str) -> Result<(), ApiError> {
        let kind = self.session_kind();
        let _guard = self.refresh_locks.for_kind(kind).lock().await;

        if let Some(raw) = self.store.load(kind.storage_key())? {
            if let Ok(session) = Session::from_json(&raw) {
                if session.token != token {
                    debug!(kind = %kind, "Rejected session already replaced");
                    return Ok(());
                }
            }
        }
        self.invalidate_session()
    }

    /// Read the cached session, ignoring it when unreadable or expiring soon
    fn cached_session(&self, kind: SessionKind) -> Result<Option<Session>, ApiError> {
        let Some(raw) = self.store.load(kind.storage_key())? else {
            return Ok(None);
        };

        match Session::from_json(&raw) {
            Ok(session) if session.kind != kind => {
                warn!(slot = kind.storage_key(), found = %session.kind, "Cached session has wrong kind");
                Ok(None)
            }
            Ok(session) if session.needs_refresh() => {
                debug!(kind = %kind, expires = %session.expires_at, "Cached session expiring, refreshing");
                Ok(None)
            }
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(slot = kind.storage_key(), error = %e, "Discarding unreadable cached session");
                Ok(None)
            }
        }
    }

    /// Obtain a new session from the authenticate endpoint for `kind`
    async fn authenticate(&self, kind: SessionKind) -> Result<Session, ApiError> {
        let mut headers = HeaderMap::new();
        if kind == SessionKind::User {
            self.insert_csrf(&mut headers)?;
        }

        let request = HttpRequest {
            method: Method::POST,
            url: self.api_url(kind.authenticate_path(), &[])?,
            headers,
            payload: None,
        };

        let response = self.transport.execute(request).await?;
        let value = Self::parse_response(response)?;
        let auth: AuthResponse = serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse authenticate response: {}", e)))?;

        if auth.kind != kind.as_str() {
            return Err(ApiError::SessionKindMismatch {
                expected: kind,
                actual: auth.kind,
            });
        }

        Ok(Session::new(kind, auth.session, auth.expires))
    }

    // ===== Requests =====

    /// Perform an authenticated call and decode the JSON response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: impl Into<Body>,
    ) -> Result<T, ApiError> {
        let value = self.request_value(path, method, body.into()).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    /// GET without parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(path, Method::GET, Body::Empty).await
    }

    /// Perform an authenticated call and return the raw JSON response.
    ///
    /// An empty response body yields `Value::Null`.
    pub async fn request_value(&self, path: &str, method: Method, body: Body) -> Result<Value, ApiError> {
        let (url, payload) = self.prepare(path, &method, &body)?;

        let mut attempt = 1;
        loop {
            let token = self.get_session().await?;
            match self.send_once(&method, &url, payload.as_ref(), &token).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_session_invalidation() && attempt < MAX_ATTEMPTS => {
                    warn!(path = path, attempt = attempt, error = %e, "Session rejected, retrying with a new one");
                    self.invalidate_if_current(&token).await?;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolve the URL and payload of a call. Bodies of GET and DELETE go
    /// into the query string.
    fn prepare(&self, path: &str, method: &Method, body: &Body) -> Result<(Url, Option<Payload>), ApiError> {
        Ok(match body {
            Body::Empty => (self.api_url(path, &[])?, None),
            Body::Form(form) => (self.api_url(path, &[])?, Some(Payload::Form(form.clone()))),
            Body::Json(value) if Self::sends_body(method) => {
                let json = serde_json::to_string(value)
                    .map_err(|e| ApiError::InvalidInput(format!("Failed to encode body: {}", e)))?;
                (self.api_url(path, &[])?, Some(Payload::Json(json)))
            }
            Body::Json(value) => (self.api_url(path, &query_pairs(value)?)?, None),
        })
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        payload: Option<&Payload>,
        token: &str,
    ) -> Result<Value, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&self.options.auth_scheme.header_value(token))?,
        );
        self.insert_csrf(&mut headers)?;

        let request = HttpRequest {
            method: method.clone(),
            url: url.clone(),
            headers,
            payload: payload.cloned(),
        };

        let response = self.transport.execute(request).await?;
        Self::parse_response(response)
    }

    fn parse_response(response: HttpResponse) -> Result<Value, ApiError> {
        if !response.status.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Response is not JSON: {}", e)))
    }

    fn insert_csrf(&self, headers: &mut HeaderMap) -> Result<(), ApiError> {
        if let Some(ref csrf) = self.options.csrf_token {
            headers.insert(HeaderName::from_static(CSRF_HEADER), HeaderValue::from_str(csrf)?);
        }
        Ok(())
    }

    fn sends_body(method: &Method) -> bool {
        *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
    }

    /// Resolve `path` under `{base}/api/v2/` and append query pairs
    fn api_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}/{}",
            self.options.base_url.trim_end_matches('/'),
            API_PREFIX,
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// Flatten a JSON object into query pairs.
///
/// Arrays become repeated keys, nulls and empty strings are dropped.
fn query_pairs(value: &Value) -> Result<Vec<(String, String)>, ApiError> {
    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(ApiError::InvalidInput(format!(
                "Query parameters must be a JSON object, got {}",
                other
            )))
        }
    };

    let mut pairs = Vec::new();
    for (key, value) in object {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = query_scalar(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = query_scalar(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    Ok(pairs)
}

fn query_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
