//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP transport,
//! secure storage) into the shared Rust core. Desktop apps typically enable
//! the `desktop-shims` feature (which depends on `bridge-desktop`) and let
//! the builder inject reqwest/keyring defaults; mobile hosts inject their
//! own platform-native adapters.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{http::HttpClient, storage::SecureStore};
use core_api::ApiClient;
use core_auth::TokenStore;
use core_runtime::config::ApiConfig;
use core_runtime::events::EventBus;
use core_session::SessionStore;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub secure_store: Arc<dyn SecureStore>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(http_client: Arc<dyn HttpClient>, secure_store: Arc<dyn SecureStore>) -> Self {
        Self {
            http_client,
            secure_store,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    api: ApiClient,
    session: Arc<SessionStore>,
    events: EventBus,
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService").finish_non_exhaustive()
    }
}

impl CoreService {
    /// Create a new service from validated config and explicit bridges.
    pub fn new(config: ApiConfig, deps: CoreDependencies) -> Self {
        let events = EventBus::default();
        let tokens = TokenStore::new(deps.secure_store);
        let api = ApiClient::new(config, deps.http_client, tokens, events.clone());
        let session = Arc::new(SessionStore::new(api.clone(), events.clone()));

        Self {
            api,
            session,
            events,
        }
    }

    /// Creates a builder that can fall back to desktop default bridges.
    pub fn builder() -> CoreServiceBuilder {
        CoreServiceBuilder::default()
    }

    /// The authenticated API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The session store (hydrate/login/logout).
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The event bus host UIs subscribe to.
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Builder wiring config and bridges into a [`CoreService`].
///
/// Bridges not provided explicitly fall back to the desktop shims when the
/// `desktop-shims` feature is enabled; otherwise building fails fast with
/// an actionable [`CoreError::CapabilityMissing`].
#[derive(Default)]
pub struct CoreServiceBuilder {
    config: Option<ApiConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
}

impl CoreServiceBuilder {
    /// Sets the API configuration (required).
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the HTTP transport implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the secure store implementation.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Builds the service, injecting desktop defaults where available.
    pub fn build(self) -> Result<CoreService> {
        let config = self.config.ok_or_else(|| {
            CoreError::InitializationFailed(
                "API configuration is required. Use .config() to set it.".to_string(),
            )
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => default_http_client(&config)?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => default_secure_store()?,
        };

        Ok(CoreService::new(
            config,
            CoreDependencies::new(http_client, secure_store),
        ))
    }
}

#[cfg(feature = "desktop-shims")]
fn default_http_client(config: &ApiConfig) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    Ok(Arc::new(ReqwestHttpClient::with_timeout(config.timeout)))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_http_client(_config: &ApiConfig) -> Result<Arc<dyn HttpClient>> {
    Err(CoreError::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP transport provided. \
                  Desktop: enable the 'desktop-shims' feature for the reqwest default. \
                  Mobile: inject a platform-native adapter."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    Ok(Arc::new(KeyringSecureStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(CoreError::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "No secure storage provided. \
                  Desktop: enable the 'desktop-shims' feature for the keyring default. \
                  Mobile: inject platform-native secure storage (Keychain/Keystore)."
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StubTransport;

    #[async_trait::async_trait]
    impl HttpClient for StubTransport {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                headers: HashMap::new(),
                body: bytes::Bytes::new(),
            })
        }
    }

    #[derive(Default)]
    struct StubSecureStore {
        storage: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait::async_trait]
    impl SecureStore for StubSecureStore {
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

    fn test_config() -> ApiConfig {
        ApiConfig::builder()
            .base_url("https://api.example.com")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_builder_with_explicit_bridges() {
        let service = CoreService::builder()
            .config(test_config())
            .http_client(Arc::new(StubTransport))
            .secure_store(Arc::new(StubSecureStore::default()))
            .build()
            .unwrap();

        // Shared token store between API client and session
        service.api().tokens().save_access_token("abc").await.unwrap();
        service.session().hydrate().await;
        let snapshot = service.session().snapshot().await;
        assert_eq!(snapshot.access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_builder_requires_config() {
        let result = CoreService::builder()
            .http_client(Arc::new(StubTransport))
            .secure_store(Arc::new(StubSecureStore::default()))
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("configuration is required"));
    }

    #[tokio::test]
    async fn test_service_is_cloneable_and_shares_state() {
        let service = CoreService::builder()
            .config(test_config())
            .http_client(Arc::new(StubTransport))
            .secure_store(Arc::new(StubSecureStore::default()))
            .build()
            .unwrap();

        let clone = service.clone();
        service.api().tokens().save_access_token("shared").await.unwrap();

        assert_eq!(
            clone.api().tokens().access_token().await.unwrap().as_deref(),
            Some("shared")
        );
    }
}
