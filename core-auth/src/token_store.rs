//! Secure Token Storage
//!
//! Persists the session credentials (access token, refresh token, cached
//! user profile) through the platform's [`SecureStore`] bridge.
//!
//! ## Security Features
//!
//! - Tokens are never logged or exposed in error messages
//! - Storage uses platform-specific secure stores (via the `SecureStore` trait)
//! - Corrupted cached profiles are tolerated, not fatal
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::TokenStore;
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let tokens = TokenStore::new(secure_store);
//!
//! tokens.save_access_token("access_token_value").await?;
//! let current = tokens.access_token().await?;
//!
//! tokens.clear().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::AuthUser;
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

const KEY_ACCESS_TOKEN: &str = "auth.access_token";
const KEY_REFRESH_TOKEN: &str = "auth.refresh_token";
const KEY_USER: &str = "auth.user";

/// Secure storage for session credentials.
///
/// A thin, typed layer over the platform [`SecureStore`]: fixed key
/// namespace, whitespace-trimmed token values, JSON-encoded user profile.
/// Blank tokens are treated as absent on both read and write, matching how
/// the rest of the core interprets "no token".
#[derive(Clone)]
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
}

impl TokenStore {
    /// Create a new token store
    ///
    /// # Arguments
    ///
    /// * `secure_store` - Platform-specific secure storage implementation
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        debug!("Initializing TokenStore");
        Self { secure_store }
    }

    /// Retrieve the current access token.
    ///
    /// Returns `Ok(None)` when no token is stored, when the stored value is
    /// blank, or when it is not valid UTF-8 (corrupt entries are treated as
    /// absent rather than fatal).
    pub async fn access_token(&self) -> Result<Option<String>> {
        self.read_trimmed(KEY_ACCESS_TOKEN).await
    }

    /// Persist a new access token. A blank token is a no-op.
    pub async fn save_access_token(&self, token: &str) -> Result<()> {
        self.write_trimmed(KEY_ACCESS_TOKEN, token).await
    }

    /// Retrieve the current refresh token.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.read_trimmed(KEY_REFRESH_TOKEN).await
    }

    /// Persist a new refresh token. A blank token is a no-op.
    pub async fn save_refresh_token(&self, token: &str) -> Result<()> {
        self.write_trimmed(KEY_REFRESH_TOKEN, token).await
    }

    /// Retrieve the cached user profile.
    ///
    /// A corrupted cached profile is tolerated and reported as `None`; the
    /// profile is a convenience cache, not the source of truth.
    pub async fn user(&self) -> Result<Option<AuthUser>> {
        let Some(data) = self.get(KEY_USER).await? else {
            return Ok(None);
        };

        match serde_json::from_slice(&data) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Cached user profile is corrupted, ignoring it");
                Ok(None)
            }
        }
    }

    /// Persist the user profile alongside the tokens.
    pub async fn save_user(&self, user: &AuthUser) -> Result<()> {
        let json = serde_json::to_vec(user).map_err(|e| AuthError::SerializationFailed {
            context: "user profile".to_string(),
            reason: e.to_string(),
        })?;

        self.set(KEY_USER, &json).await?;
        debug!("Stored user profile");
        Ok(())
    }

    /// Whether a stored session (access token) exists.
    pub async fn has_session(&self) -> Result<bool> {
        Ok(self.access_token().await?.is_some())
    }

    /// Remove every stored credential.
    ///
    /// All three entries are deleted even if one of the deletions fails; the
    /// first failure is reported after the sweep completes.
    pub async fn clear(&self) -> Result<()> {
        let mut first_error = None;

        for key in [KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_USER] {
            if let Err(e) = self.secure_store.delete_secret(key).await {
                warn!(key = key, error = %e, "Failed to delete stored credential");
                first_error
                    .get_or_insert_with(|| AuthError::SecureStorageUnavailable(e.to_string()));
            }
        }

        match first_error {
            None => {
                info!("Stored credentials cleared");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }

    async fn read_trimmed(&self, key: &str) -> Result<Option<String>> {
        let Some(data) = self.get(key).await? else {
            return Ok(None);
        };

        let value = match String::from_utf8(data) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key, error = %e, "Stored value is not valid UTF-8, ignoring it");
                return Ok(None);
            }
        };

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    async fn write_trimmed(&self, key: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.set(key, trimmed.as_bytes()).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.secure_store.get_secret(key).await.map_err(|e| {
            warn!(key = key, error = %e, "Failed to read from secure storage");
            AuthError::SecureStorageUnavailable(e.to_string())
        })
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.secure_store.set_secret(key, value).await.map_err(|e| {
            warn!(key = key, error = %e, "Failed to write to secure storage");
            AuthError::SecureStorageUnavailable(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Mock implementation of SecureStore for testing
    #[derive(Clone, Default)]
    struct MockSecureStore {
        storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockSecureStore {
        fn new() -> Self {
            Self::default()
        }

        async fn insert_raw(&self, key: &str, value: &[u8]) {
            let mut storage = self.storage.lock().await;
            storage.insert(key.to_string(), value.to_vec());
        }
    }

    #[async_trait::async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
            let mut storage = self.storage.lock().await;
            storage.insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
            let storage = self.storage.lock().await;
            Ok(storage.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            let mut storage = self.storage.lock().await;
            storage.remove(key);
            Ok(())
        }
    }

    mockall::mock! {
        FailingStore {}

        #[async_trait::async_trait]
        impl SecureStore for FailingStore {
            async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()>;
            async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>>;
            async fn delete_secret(&self, key: &str) -> BridgeResult<()>;
        }
    }

    #[tokio::test]
    async fn test_save_and_load_tokens() {
        let store = TokenStore::new(Arc::new(MockSecureStore::new()));

        store.save_access_token("access-123").await.unwrap();
        store.save_refresh_token("refresh-456").await.unwrap();

        assert_eq!(
            store.access_token().await.unwrap().as_deref(),
            Some("access-123")
        );
        assert_eq!(
            store.refresh_token().await.unwrap().as_deref(),
            Some("refresh-456")
        );
    }

    #[tokio::test]
    async fn test_tokens_are_trimmed_on_save() {
        let store = TokenStore::new(Arc::new(MockSecureStore::new()));

        store.save_access_token("  access-123  ").await.unwrap();

        assert_eq!(
            store.access_token().await.unwrap().as_deref(),
            Some("access-123")
        );
    }

    #[tokio::test]
    async fn test_blank_token_save_is_noop() {
        let store = TokenStore::new(Arc::new(MockSecureStore::new()));

        store.save_access_token("   ").await.unwrap();

        assert!(store.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_stored_token_reads_as_absent() {
        let mock = MockSecureStore::new();
        mock.insert_raw(KEY_ACCESS_TOKEN, b"   ").await;
        let store = TokenStore::new(Arc::new(mock));

        assert!(store.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_tokens_read_as_none() {
        let store = TokenStore::new(Arc::new(MockSecureStore::new()));

        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
        assert!(store.user().await.unwrap().is_none());
        assert!(!store.has_session().await.unwrap());
    }

    #[tokio::test]
    async fn test_save_and_load_user() {
        let store = TokenStore::new(Arc::new(MockSecureStore::new()));

        let user = AuthUser {
            id: Some("u-1".to_string()),
            name: Some("Linh".to_string()),
            ..AuthUser::default()
        };
        store.save_user(&user).await.unwrap();

        let loaded = store.user().await.unwrap().unwrap();
        assert_eq!(loaded, user);
    }

    #[tokio::test]
    async fn test_corrupt_user_profile_reads_as_none() {
        let mock = MockSecureStore::new();
        mock.insert_raw(KEY_USER, b"{not json").await;
        let store = TokenStore::new(Arc::new(mock));

        assert!(store.user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_token_reads_as_none() {
        let mock = MockSecureStore::new();
        mock.insert_raw(KEY_ACCESS_TOKEN, &[0xff, 0xfe, 0xfd]).await;
        let store = TokenStore::new(Arc::new(mock));

        assert!(store.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = TokenStore::new(Arc::new(MockSecureStore::new()));

        store.save_access_token("access").await.unwrap();
        store.save_refresh_token("refresh").await.unwrap();
        store
            .save_user(&AuthUser {
                id: Some("u-1".to_string()),
                ..AuthUser::default()
            })
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
        assert!(store.user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = TokenStore::new(Arc::new(MockSecureStore::new()));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let mut mock = MockFailingStore::new();
        mock.expect_get_secret()
            .returning(|_| Err(BridgeError::OperationFailed("keychain locked".to_string())));

        let store = TokenStore::new(Arc::new(mock));
        let result = store.access_token().await;

        assert!(matches!(
            result,
            Err(AuthError::SecureStorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_attempts_every_key_despite_failure() {
        let mut mock = MockFailingStore::new();
        // All three deletions are attempted even though each fails
        mock.expect_delete_secret()
            .times(3)
            .returning(|_| Err(BridgeError::OperationFailed("keychain locked".to_string())));

        let store = TokenStore::new(Arc::new(mock));
        let result = store.clear().await;

        assert!(matches!(
            result,
            Err(AuthError::SecureStorageUnavailable(_))
        ));
    }
}
