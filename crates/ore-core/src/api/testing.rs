//! Test doubles shared by the client and endpoint tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::auth::{MemoryStore, SessionStore, StoreError};

use super::client::{ApiClient, ClientOptions};
use super::transport::{HttpRequest, HttpResponse, Transport};
use super::ApiError;

/// Transport replaying canned responses in order and recording every request.
///
/// Every call yields to the scheduler once before answering, so concurrent
/// callers interleave the way they do over a real network.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn shared(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::InvalidResponse("no scripted response left".to_string()))
    }
}

/// `MemoryStore` that counts writes made through the `SessionStore` trait
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: Arc<MemoryStore>,
    writes: Arc<Mutex<usize>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a slot without counting it as a write
    pub fn seed(&self, key: &str, value: &str) {
        self.inner.save(key, value).unwrap();
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.load(key).unwrap()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn shared(&self) -> Arc<dyn SessionStore> {
        Arc::new(self.clone())
    }
}

impl SessionStore for CountingStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        *self.writes.lock().unwrap() += 1;
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

pub fn client_with(base: &str, has_user: bool, store: &CountingStore, transport: &MockTransport) -> ApiClient {
    ApiClient::with_transport(
        ClientOptions::new(base).has_user(has_user),
        store.shared(),
        transport.shared(),
    )
}

/// Stored form of a session
pub fn session_json(kind: &str, token: &str, expires: DateTime<Utc>) -> String {
    serde_json::json!({"type": kind, "session": token, "expires": expires.to_rfc3339()}).to_string()
}

/// Authenticate response valid for an hour
pub fn auth_body(kind: &str, token: &str) -> String {
    session_json(kind, token, Utc::now() + Duration::hours(1))
}

/// Client with a valid cached public session, for endpoint tests
pub fn public_client(transport: &MockTransport) -> ApiClient {
    let store = CountingStore::new();
    store.seed("public_api_session", &auth_body("public", "p"));
    client_with("https://ore.example.org", false, &store, transport)
}

/// Client with a valid cached user session, for endpoint tests
pub fn user_client(transport: &MockTransport) -> ApiClient {
    let store = CountingStore::new();
    store.seed("api_session", &auth_body("user", "u"));
    client_with("https://ore.example.org", true, &store, transport)
}
