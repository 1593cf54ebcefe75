//! Shared fixtures for the pipeline and refresh tests: an in-memory secure
//! store and a scriptable transport that plays the roles of the resource
//! server and the refresh endpoint.

use crate::client::ApiClient;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::storage::SecureStore;
use bytes::Bytes;
use core_auth::TokenStore;
use core_runtime::config::ApiConfig;
use core_runtime::events::EventBus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory SecureStore for tests.
#[derive(Default)]
pub(crate) struct MemorySecureStore {
    storage: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait::async_trait]
impl SecureStore for MemorySecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        self.storage
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.storage.lock().unwrap().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
        self.storage.lock().unwrap().remove(key);
        Ok(())
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::from([(
            "content-type".to_string(),
            "application/json".to_string(),
        )]),
        body: Bytes::from(serde_json::to_vec(&body).unwrap()),
    }
}

/// Scriptable transport standing in for the API gateway.
///
/// Resource requests succeed only when they carry the current fresh token;
/// anything else is answered with 401, which is exactly the situation the
/// refresh protocol exists for. The refresh endpoint mints the fresh token
/// (optionally after a delay, so concurrent callers pile up on one cycle).
pub(crate) struct ScriptedTransport {
    fresh_token: Mutex<String>,
    rotated_refresh_token: Mutex<Option<String>>,
    refresh_ok: AtomicBool,
    refresh_body_without_token: AtomicBool,
    refresh_delay: Duration,
    resource_always_401: AtomicBool,
    resource_status_override: Mutex<Option<u16>>,
    fail_transport: AtomicBool,
    refresh_calls: AtomicUsize,
    resource_calls: AtomicUsize,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(fresh_token: &str) -> Self {
        Self {
            fresh_token: Mutex::new(fresh_token.to_string()),
            rotated_refresh_token: Mutex::new(None),
            refresh_ok: AtomicBool::new(true),
            refresh_body_without_token: AtomicBool::new(false),
            refresh_delay: Duration::ZERO,
            resource_always_401: AtomicBool::new(false),
            resource_status_override: Mutex::new(None),
            fail_transport: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Delay the refresh response so concurrent 401s overlap one cycle.
    pub(crate) fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub(crate) fn set_fresh_token(&self, token: &str) {
        *self.fresh_token.lock().unwrap() = token.to_string();
    }

    pub(crate) fn set_refresh_ok(&self, ok: bool) {
        self.refresh_ok.store(ok, Ordering::SeqCst);
    }

    pub(crate) fn set_rotated_refresh_token(&self, token: Option<&str>) {
        *self.rotated_refresh_token.lock().unwrap() = token.map(str::to_string);
    }

    pub(crate) fn set_refresh_body_without_token(&self, enabled: bool) {
        self.refresh_body_without_token
            .store(enabled, Ordering::SeqCst);
    }

    pub(crate) fn set_resource_always_401(&self, enabled: bool) {
        self.resource_always_401.store(enabled, Ordering::SeqCst);
    }

    pub(crate) fn set_resource_status(&self, status: Option<u16>) {
        *self.resource_status_override.lock().unwrap() = status;
    }

    pub(crate) fn set_fail_transport(&self, enabled: bool) {
        self.fail_transport.store(enabled, Ordering::SeqCst);
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.seen.lock().unwrap().push(request.clone());

        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(
                "connection refused".to_string(),
            ));
        }

        if request.url.contains("auth/refresh-token") {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if !self.refresh_delay.is_zero() {
                tokio::time::sleep(self.refresh_delay).await;
            }

            if !self.refresh_ok.load(Ordering::SeqCst) {
                return Ok(json_response(
                    500,
                    serde_json::json!({ "message": "refresh token expired" }),
                ));
            }
            if self.refresh_body_without_token.load(Ordering::SeqCst) {
                return Ok(json_response(200, serde_json::json!({ "data": { "ok": true } })));
            }

            let mut data = serde_json::Map::new();
            data.insert(
                "accessToken".to_string(),
                serde_json::Value::String(self.fresh_token.lock().unwrap().clone()),
            );
            if let Some(rotated) = self.rotated_refresh_token.lock().unwrap().clone() {
                data.insert(
                    "refresh_token".to_string(),
                    serde_json::Value::String(rotated),
                );
            }
            return Ok(json_response(200, serde_json::json!({ "data": data })));
        }

        self.resource_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = *self.resource_status_override.lock().unwrap() {
            return Ok(json_response(
                status,
                serde_json::json!({ "message": "forced status" }),
            ));
        }

        let expected = format!("Bearer {}", self.fresh_token.lock().unwrap());
        let authorized = request.header_value("Authorization") == Some(expected.as_str());
        if self.resource_always_401.load(Ordering::SeqCst) || !authorized {
            return Ok(json_response(
                401,
                serde_json::json!({ "message": "jwt expired" }),
            ));
        }

        Ok(json_response(200, serde_json::json!({ "data": { "ok": true } })))
    }
}

pub(crate) fn test_config() -> ApiConfig {
    ApiConfig::builder()
        .base_url("https://api.example.com")
        .api_key("test-key")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub(crate) fn test_client(transport: Arc<ScriptedTransport>) -> ApiClient {
    let tokens = TokenStore::new(Arc::new(MemorySecureStore::default()));
    ApiClient::new(test_config(), transport, tokens, EventBus::new(16))
}

/// Seeds the client's store with a stale access token and a refresh token,
/// the state every refresh scenario starts from.
pub(crate) async fn seed_session(client: &ApiClient) {
    client.tokens().save_access_token("stale-token").await.unwrap();
    client.tokens().save_refresh_token("refresh-1").await.unwrap();
}
