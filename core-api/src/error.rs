//! API error taxonomy.
//!
//! Every failure surfaced by the request pipeline falls into one of these
//! classes. The split matters for recovery: only a 401 status on a request
//! that has not yet been retried enters the refresh protocol; transport
//! errors and every other status pass through untouched.

use bridge_traits::error::BridgeError;
use bridge_traits::http::HttpResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No HTTP response was received at all (DNS, connection, TLS).
    /// Never triggers a token refresh.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The transport gave up waiting. Like [`ApiError::Network`], this is a
    /// distinct non-retriable class.
    #[error("Request timed out: {message}")]
    Timeout { message: String },

    /// The server answered with a non-success status. 401s only appear here
    /// as the *original* error of a request whose refresh cycle failed.
    #[error("Request failed with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Unauthorized after the one permitted refresh-and-retry cycle. The
    /// app-level response is to clear the session and force re-login.
    #[error("Authentication failed: {message}")]
    Unauthorized { message: String },

    /// A refresh was required but no refresh token is stored. Fails fast,
    /// before any network call.
    #[error("No refresh token")]
    MissingRefreshToken,

    /// The refresh endpoint rejected the call or returned garbage.
    #[error("Token refresh failed: {message}")]
    RefreshFailed { message: String },

    /// A success response that should have carried an access token did not,
    /// under any recognized shape.
    #[error("{context} failed: access token not found in response")]
    MissingAccessToken { context: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Storage(#[from] core_auth::AuthError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// HTTP status carried by this error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// Whether no HTTP response was received at all.
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network { .. } | ApiError::Timeout { .. })
    }

    /// Maps a transport failure into the error taxonomy.
    pub(crate) fn from_transport(e: BridgeError) -> Self {
        if e.is_timeout() {
            ApiError::Timeout {
                message: e.to_string(),
            }
        } else {
            ApiError::Network {
                message: e.to_string(),
            }
        }
    }

    /// Builds a status error from a non-success response, extracting the
    /// most useful human-readable message the body offers.
    pub(crate) fn from_response(response: &HttpResponse) -> Self {
        let details: Option<serde_json::Value> = serde_json::from_slice(&response.body).ok();
        ApiError::Status {
            status: response.status,
            message: error_message(response),
            details,
        }
    }
}

/// Picks a human-readable error message out of a response body.
///
/// Servers in the wild answer with `{"message": …}`, `{"error": …}`,
/// `{"msg": …}`, a bare JSON string, or plain text; each is tried in turn
/// before falling back to a generic message.
pub(crate) fn error_message(response: &HttpResponse) -> String {
    let fallback = || format!("Request failed with status {}", response.status);

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&response.body) {
        if let Some(s) = value.as_str() {
            if !s.trim().is_empty() {
                return s.trim().to_string();
            }
        }
        for key in ["message", "error", "msg"] {
            if let Some(s) = value.get(key).and_then(serde_json::Value::as_str) {
                if !s.trim().is_empty() {
                    return s.trim().to_string();
                }
            }
        }
        return fallback();
    }

    match std::str::from_utf8(&response.body) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashMap;

    fn response_with_body(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        let response = response_with_body(400, r#"{"message":"Invalid phone","error":"ignored"}"#);
        assert_eq!(error_message(&response), "Invalid phone");
    }

    #[test]
    fn test_error_message_falls_back_to_error_then_msg() {
        let response = response_with_body(400, r#"{"error":"Bad request"}"#);
        assert_eq!(error_message(&response), "Bad request");

        let response = response_with_body(400, r#"{"msg":"Nope"}"#);
        assert_eq!(error_message(&response), "Nope");
    }

    #[test]
    fn test_error_message_accepts_bare_string_body() {
        let response = response_with_body(500, r#""everything is on fire""#);
        assert_eq!(error_message(&response), "everything is on fire");
    }

    #[test]
    fn test_error_message_accepts_plain_text_body() {
        let response = response_with_body(502, "Bad Gateway");
        assert_eq!(error_message(&response), "Bad Gateway");
    }

    #[test]
    fn test_error_message_generic_fallback() {
        let response = response_with_body(503, "");
        assert_eq!(error_message(&response), "Request failed with status 503");
    }

    #[test]
    fn test_from_response_keeps_status_and_details() {
        let response = response_with_body(422, r#"{"message":"Invalid","field":"email"}"#);
        let err = ApiError::from_response(&response);

        match err {
            ApiError::Status {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid");
                assert_eq!(details.unwrap()["field"], "email");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_transport_classifies_timeouts() {
        let err = ApiError::from_transport(BridgeError::TimedOut("deadline".to_string()));
        assert!(matches!(err, ApiError::Timeout { .. }));
        assert!(err.is_network_error());

        let err = ApiError::from_transport(BridgeError::OperationFailed("refused".to_string()));
        assert!(matches!(err, ApiError::Network { .. }));
        assert!(err.is_network_error());
    }

    #[test]
    fn test_status_accessor() {
        let err = ApiError::Unauthorized {
            message: "expired".to_string(),
        };
        assert_eq!(err.status(), Some(401));

        let err = ApiError::MissingRefreshToken;
        assert_eq!(err.status(), None);
    }
}
