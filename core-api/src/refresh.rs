//! Single-flight token refresh.
//!
//! Any number of in-flight requests can hit an expired access token at the
//! same time. The coordinator guarantees that exactly one refresh call goes
//! out per cycle: the first unauthorized caller becomes the trigger and
//! performs the refresh; everyone else parks a waiter in a FIFO queue and
//! suspends until the cycle settles.
//!
//! The `refreshing` flag flips *inside* the state lock, before the refresh
//! future is ever awaited. That closes the race between unauthorized
//! responses arriving back-to-back: a caller observing the flag either joins
//! the current cycle's queue or starts a new cycle, never a second refresh
//! within the same cycle.
//!
//! On success the new access token is persisted (plus the rotated refresh
//! token when the server sent one), every waiter is woken in enqueue order
//! with the new token, and the trigger resumes last. On failure the waiters
//! are woken empty-handed (their requests fail with their original
//! unauthorized error) and the stored credentials are cleared so the app
//! can fall back to the login screen.

use crate::endpoints;
use crate::error::{ApiError, Result};
use crate::extract;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_auth::TokenStore;
use core_runtime::config::ApiConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

/// Tokens minted by a successful refresh call. The rotated refresh token is
/// server-dependent and optional; when absent the previous one stays valid.
pub(crate) struct MintedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for MintedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintedTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// What a caller that consulted the coordinator should do next.
pub(crate) enum RefreshOutcome {
    /// A refresh settled successfully; resubmit with this access token.
    Refreshed(String),
    /// The cycle this caller waited on failed. The caller's original
    /// unauthorized error stands; no retry is attempted.
    CycleFailed,
}

/// Coordinator-internal cycle state.
///
/// Invariant: `waiters` is non-empty only while `refreshing` is true. Both
/// fields are mutated together under the one lock, so a drain is atomic
/// from the callers' perspective.
struct CycleState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Option<String>>>,
}

/// Serializes token refresh across all in-flight requests of one client.
///
/// Owned by the [`ApiClient`](crate::ApiClient) instance (constructed with
/// it, never process-global), so tests get a fresh coordinator per client.
pub(crate) struct RefreshCoordinator {
    transport: Arc<dyn HttpClient>,
    tokens: TokenStore,
    config: ApiConfig,
    events: EventBus,
    cycle: Mutex<CycleState>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        transport: Arc<dyn HttpClient>,
        tokens: TokenStore,
        config: ApiConfig,
        events: EventBus,
    ) -> Self {
        Self {
            transport,
            tokens,
            config,
            events,
            cycle: Mutex::new(CycleState {
                refreshing: false,
                waiters: Vec::new(),
            }),
        }
    }

    /// Entry point for a request that just received its first 401.
    ///
    /// Either becomes the trigger of a new refresh cycle or joins the
    /// queue of the cycle already in flight.
    pub(crate) async fn obtain_fresh_token(&self) -> Result<RefreshOutcome> {
        // The flag must flip inside this critical section, before any
        // asynchronous work: a caller arriving after the lock is released
        // observes Refreshing and enqueues instead of refreshing again.
        let waiter = {
            let mut cycle = self.cycle.lock().await;
            if cycle.refreshing {
                let (tx, rx) = oneshot::channel();
                cycle.waiters.push(tx);
                Some(rx)
            } else {
                cycle.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("Refresh already in flight, queueing until it settles");
            return match rx.await {
                Ok(Some(token)) => Ok(RefreshOutcome::Refreshed(token)),
                // Failure fan-out, or the trigger was dropped mid-cycle.
                Ok(None) | Err(_) => Ok(RefreshOutcome::CycleFailed),
            };
        }

        self.run_refresh_cycle().await.map(RefreshOutcome::Refreshed)
    }

    /// Trigger path: performs the refresh, persists the result and settles
    /// every queued waiter. The flag is reset on both outcomes.
    async fn run_refresh_cycle(&self) -> Result<String> {
        let _ = self
            .events
            .emit(CoreEvent::Auth(AuthEvent::TokenRefreshing));

        let result = async {
            let minted = self.refresh_access_token().await?;
            self.tokens.save_access_token(&minted.access_token).await?;
            if let Some(refresh_token) = &minted.refresh_token {
                self.tokens.save_refresh_token(refresh_token).await?;
            }
            Ok::<_, ApiError>(minted.access_token)
        }
        .await;

        // Flag reset and queue drain happen in one critical section: a
        // caller either joined this settlement or starts a fresh cycle. No
        // waiter can be added to a batch already taken out for draining.
        let waiters = {
            let mut cycle = self.cycle.lock().await;
            cycle.refreshing = false;
            std::mem::take(&mut cycle.waiters)
        };

        match result {
            Ok(token) => {
                info!(waiters = waiters.len(), "Access token refreshed");
                for waiter in waiters {
                    let _ = waiter.send(Some(token.clone()));
                }
                let _ = self.events.emit(CoreEvent::Auth(AuthEvent::TokenRefreshed));
                Ok(token)
            }
            Err(err) => {
                warn!(
                    waiters = waiters.len(),
                    error = %err,
                    "Token refresh failed, clearing session"
                );
                for waiter in waiters {
                    let _ = waiter.send(None);
                }
                if let Err(clear_err) = self.tokens.clear().await {
                    warn!(error = %clear_err, "Failed to clear credentials after refresh failure");
                }
                let _ = self.events.emit(CoreEvent::Auth(AuthEvent::AuthError {
                    message: err.to_string(),
                    recoverable: false,
                }));
                Err(err)
            }
        }
    }

    /// The refresh operation itself: one network call exchanging the stored
    /// refresh token for a new access token.
    ///
    /// Fails fast, without a network call, when no refresh token is stored.
    /// Persistence of the minted tokens is the cycle's responsibility, not
    /// this operation's.
    async fn refresh_access_token(&self) -> Result<MintedTokens> {
        let Some(refresh_token) = self.tokens.refresh_token().await? else {
            return Err(ApiError::MissingRefreshToken);
        };

        let url = self.config.endpoint_url(endpoints::AUTH_REFRESH_TOKEN);
        let mut request = HttpRequest::new(HttpMethod::Post, url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .map_err(|e| ApiError::Serialization(e.to_string()))?
            .header("Accept", "application/json")
            .timeout(self.config.timeout);

        if let Some(api_key) = &self.config.api_key {
            request = request.header("x-api-key", api_key.clone());
        }

        // Straight to the transport: a 401 from the refresh endpoint is a
        // refresh failure, not a trigger for another cycle.
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(ApiError::from_transport)?;

        if !response.is_success() {
            return Err(ApiError::RefreshFailed {
                message: crate::error::error_message(&response),
            });
        }

        let body: serde_json::Value = response.json().map_err(|e| ApiError::RefreshFailed {
            message: format!("Malformed refresh response: {}", e),
        })?;

        let access_token =
            extract::pick_access_token(&body).ok_or_else(|| ApiError::MissingAccessToken {
                context: "Refresh".to_string(),
            })?;
        let refresh_token = extract::pick_refresh_token(&body);

        Ok(MintedTokens {
            access_token,
            refresh_token,
        })
    }
}
