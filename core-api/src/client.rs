//! The authenticated request pipeline.
//!
//! Every outgoing request flows through one [`ApiClient`], which decorates
//! it before transmission and classifies the result afterwards.
//!
//! Outbound, in order:
//! - attach the configured `x-api-key` header unless the caller set one
//! - resolve the current access token from the store and attach
//!   `Authorization: Bearer …` unless the caller set the header explicitly
//! - default `Content-Type: application/json` unless the body is multipart
//!   or the caller chose a content type
//! - in diagnostic mode, log the method and full URL (never blocking or
//!   altering the request)
//!
//! Inbound:
//! - success responses pass through unchanged
//! - transport failures (no response received) surface unchanged and never
//!   trigger a refresh
//! - a first 401 enters the refresh protocol (see [`crate::refresh`]) and
//!   the request is resubmitted once with the new token
//! - a 401 on an already-retried request is a terminal authentication
//!   failure
//! - every other error status passes through as [`ApiError::Status`]

use crate::error::{error_message, ApiError, Result};
use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use crate::request::ApiRequest;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_auth::TokenStore;
use core_runtime::config::ApiConfig;
use core_runtime::events::{ApiEvent, CoreEvent, EventBus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Authenticated HTTP client for the restaurant API.
///
/// Cheap to clone; clones share the token store and the refresh
/// coordinator, so the single-flight guarantee holds across all of them.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpClient>,
    tokens: TokenStore,
    config: ApiConfig,
    events: EventBus,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `config` - validated API configuration
    /// * `transport` - platform HTTP transport
    /// * `tokens` - token store shared with the session layer
    /// * `events` - bus for auth/api events
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn HttpClient>,
        tokens: TokenStore,
        events: EventBus,
    ) -> Self {
        let coordinator = Arc::new(RefreshCoordinator::new(
            transport.clone(),
            tokens.clone(),
            config.clone(),
            events.clone(),
        ));

        Self {
            transport,
            tokens,
            config,
            events,
            coordinator,
        }
    }

    /// The token store backing this client.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sends a request through the full pipeline.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the taxonomy. The only transparent recovery is
    /// the single refresh-and-retry cycle on a first 401; nothing is ever
    /// retried beyond that.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<HttpResponse> {
        let response = self.dispatch(&request).await?;

        if response.status == 401 && !request.retried {
            let unauthorized = ApiError::from_response(&response);
            request.retried = true;
            debug!("Received 401, entering refresh protocol");

            return match self.coordinator.obtain_fresh_token().await {
                Ok(RefreshOutcome::Refreshed(token)) => {
                    request.set_bearer(&token);
                    // Resubmitted through the full pipeline: the response is
                    // classified again, but `retried` blocks a second cycle.
                    let response = self.dispatch(&request).await?;
                    self.conclude(&request, response)
                }
                // The cycle this request waited on failed: its original
                // unauthorized error stands, with no retry.
                Ok(RefreshOutcome::CycleFailed) => {
                    Err(self.observe_failure(&request, unauthorized))
                }
                Err(refresh_err) => Err(self.observe_failure(&request, refresh_err)),
            };
        }

        self.conclude(&request, response)
    }

    /// GET returning a deserialized JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(ApiRequest::get(path)).await?;
        response
            .json()
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// POST with a JSON payload, returning a deserialized JSON body.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(ApiRequest::post(path).json(body)?).await?;
        response
            .json()
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// PATCH with a JSON payload, returning a deserialized JSON body.
    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(ApiRequest::patch(path).json(body)?).await?;
        response
            .json()
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// DELETE returning the raw response.
    pub async fn delete(&self, path: &str) -> Result<HttpResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Decorates and transmits one request. Transport-level failures are
    /// mapped into the taxonomy here; status classification is the
    /// caller's job.
    async fn dispatch(&self, request: &ApiRequest) -> Result<HttpResponse> {
        let prepared = self.prepare(request).await?;

        if self.config.debug {
            debug!(method = %request.method, url = %prepared.url, "[api] dispatching");
            let _ = self.events.emit(CoreEvent::Api(ApiEvent::RequestStarted {
                method: request.method.as_str().to_string(),
                url: prepared.url.clone(),
            }));
        }

        self.transport.execute(prepared).await.map_err(|e| {
            // No response received: surfaced unchanged, never refreshed.
            self.observe_failure(request, ApiError::from_transport(e))
        })
    }

    /// Applies the outbound contract to a request descriptor.
    async fn prepare(&self, request: &ApiRequest) -> Result<HttpRequest> {
        let url = self.config.endpoint_url(&request.path);
        let mut prepared = HttpRequest::new(request.method, url);

        // Caller-set headers always win
        for (key, value) in &request.headers {
            prepared = prepared.header(key.clone(), value.clone());
        }

        if let Some(api_key) = &self.config.api_key {
            if !request.has_header("x-api-key") {
                prepared = prepared.header("x-api-key", api_key.clone());
            }
        }

        if !request.has_header("Authorization") {
            if let Some(token) = self.tokens.access_token().await? {
                prepared = prepared.bearer_token(token);
            }
        }

        if !request.has_header("Accept") {
            prepared = prepared.header("Accept", "application/json");
        }

        if !request.is_multipart() && !request.has_header("Content-Type") {
            prepared = prepared.header("Content-Type", "application/json");
        }

        if let Some(body) = &request.body {
            prepared = prepared.body(body.clone());
        }

        Ok(prepared.timeout(self.config.timeout))
    }

    /// Final inbound classification for a response that is not entering the
    /// refresh protocol.
    fn conclude(&self, request: &ApiRequest, response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }

        let err = if response.status == 401 {
            // Only retried descriptors reach this point with a 401:
            // terminal authentication failure, no further refresh.
            ApiError::Unauthorized {
                message: error_message(&response),
            }
        } else {
            ApiError::from_response(&response)
        };

        Err(self.observe_failure(request, err))
    }

    /// Records a terminal failure before handing it to the caller.
    fn observe_failure(&self, request: &ApiRequest, err: ApiError) -> ApiError {
        warn!(method = %request.method, path = %request.path, error = %err, "Request failed");
        let _ = self.events.emit(CoreEvent::Api(ApiEvent::RequestFailed {
            method: request.method.as_str().to_string(),
            url: self.config.endpoint_url(&request.path),
            status: err.status(),
            message: err.to_string(),
        }));
        err
    }
}
