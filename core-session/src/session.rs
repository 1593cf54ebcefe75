//! The session store.
//!
//! Owns the in-memory authentication state and keeps it synchronized with
//! the durable [`TokenStore`]. The store is a cache: the token store is the
//! source of truth, the [`Session`] snapshot is what the UI layer renders
//! from.
//!
//! Three operations drive the lifecycle:
//!
//! - [`hydrate`](SessionStore::hydrate) loads persisted state once at
//!   startup and flips `hydrated` to true whether or not anything was found
//! - [`login`](SessionStore::login) exchanges credentials for tokens
//!   through the full request pipeline, tolerating the several response
//!   shapes the gateway is known to produce
//! - [`logout`](SessionStore::logout) clears local state unconditionally;
//!   the remote logout call is best effort by design, because signing out
//!   must work offline

use crate::error::{Result, SessionError};
use core_api::{endpoints, extract, ApiClient, ApiError, ApiRequest};
use core_auth::{AuthUser, Credentials, Session, TokenStore};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// What a successful login extracted from the server response.
struct LoginOutcome {
    access_token: String,
    refresh_token: Option<String>,
    user: Option<AuthUser>,
}

/// Process-wide authentication session, backed by the token store.
pub struct SessionStore {
    api: ApiClient,
    tokens: TokenStore,
    events: EventBus,
    state: RwLock<Session>,
}

impl SessionStore {
    /// Creates a session store sharing the client's token store.
    pub fn new(api: ApiClient, events: EventBus) -> Self {
        let tokens = api.tokens().clone();
        Self {
            api,
            tokens,
            events,
            state: RwLock::new(Session::default()),
        }
    }

    /// Loads persisted tokens and user profile into memory.
    ///
    /// Runs at most once per process: `hydrated` flips to true on the first
    /// call, success or failure, and later calls are no-ops. Until it has
    /// run, the absence of a token in the snapshot is not meaningful.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) {
        {
            let state = self.state.read().await;
            if state.hydrated {
                debug!("Session already hydrated");
                return;
            }
        }

        let loaded = async {
            Ok::<_, core_auth::AuthError>((
                self.tokens.access_token().await?,
                self.tokens.refresh_token().await?,
                self.tokens.user().await?,
            ))
        }
        .await;

        let has_session;
        {
            let mut state = self.state.write().await;
            if state.hydrated {
                // A concurrent hydrate won the race
                return;
            }

            match loaded {
                Ok((access_token, refresh_token, user)) => {
                    state.access_token = access_token;
                    state.refresh_token = refresh_token;
                    state.user = user;
                }
                Err(err) => {
                    warn!(error = %err, "Failed to load persisted session");
                    state.access_token = None;
                    state.refresh_token = None;
                    state.user = None;
                    state.last_error = Some(err.to_string());
                }
            }
            state.hydrated = true;
            has_session = state.access_token.is_some();
        }

        let _ = self
            .events
            .emit(CoreEvent::Auth(AuthEvent::SessionHydrated { has_session }));
    }

    /// Logs in with the given credentials.
    ///
    /// The access token is extracted from the response body under any
    /// recognized shape, falling back to the `Authorization` response
    /// header; a 2xx response without one is a hard failure. Tokens and
    /// user profile are persisted before the in-memory state updates.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: Credentials) -> Result<Session> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.last_error = None;
        }
        let _ = self.events.emit(CoreEvent::Auth(AuthEvent::SigningIn));

        match self.perform_login(&credentials).await {
            Ok(outcome) => {
                let snapshot = {
                    let mut state = self.state.write().await;
                    state.access_token = Some(outcome.access_token);
                    state.refresh_token = outcome.refresh_token;
                    state.user = outcome.user;
                    state.loading = false;
                    state.last_error = None;
                    state.clone()
                };

                let user_id = snapshot.user.as_ref().and_then(|u| u.id.clone());
                let _ = self
                    .events
                    .emit(CoreEvent::Auth(AuthEvent::SignedIn { user_id }));

                Ok(snapshot)
            }
            Err(err) => {
                let message = err.to_string();
                {
                    let mut state = self.state.write().await;
                    state.loading = false;
                    state.last_error = Some(message.clone());
                }
                let _ = self.events.emit(CoreEvent::Auth(AuthEvent::AuthError {
                    message,
                    recoverable: true,
                }));
                Err(err)
            }
        }
    }

    /// Signs out.
    ///
    /// The remote logout call is fired first and its failure swallowed;
    /// the user must be able to sign out while offline. Local state, both
    /// persisted and in-memory, is cleared unconditionally afterwards.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if let Err(err) = self.api.send(ApiRequest::post(endpoints::AUTH_LOGOUT)).await {
            warn!(error = %err, "Remote logout failed, clearing local session anyway");
        }

        let clear_result = self.tokens.clear().await;

        {
            let mut state = self.state.write().await;
            state.access_token = None;
            state.refresh_token = None;
            state.user = None;
            state.last_error = None;
        }

        let _ = self.events.emit(CoreEvent::Auth(AuthEvent::SignedOut));

        clear_result.map_err(SessionError::from)
    }

    /// A copy of the current in-memory session state.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    async fn perform_login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let request = ApiRequest::post(endpoints::AUTH_LOGIN).json(credentials)?;
        let response = self.api.send(request).await?;

        // The body may legitimately be empty when the token arrives via
        // the Authorization response header instead.
        let body: serde_json::Value = response.json().unwrap_or(serde_json::Value::Null);
        let header_token = extract::bearer_from_header(&response.headers);

        let access_token = extract::pick_access_token(&body)
            .or(header_token)
            .ok_or_else(|| {
                SessionError::Api(ApiError::MissingAccessToken {
                    context: "Login".to_string(),
                })
            })?;

        let refresh_token = extract::pick_refresh_token(&body);
        let user = extract::pick_user(&body)
            .and_then(|value| serde_json::from_value::<AuthUser>(value.clone()).ok());

        self.tokens.save_access_token(&access_token).await?;
        if let Some(refresh_token) = &refresh_token {
            self.tokens.save_refresh_token(refresh_token).await?;
        }
        if let Some(user) = &user {
            self.tokens.save_user(user).await?;
        }

        Ok(LoginOutcome {
            access_token,
            refresh_token,
            user,
        })
    }
}
