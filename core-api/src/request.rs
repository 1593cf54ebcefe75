//! Outgoing request descriptor.
//!
//! An [`ApiRequest`] names an endpoint relative to the configured base URL
//! and carries only what the caller decided explicitly; credentials and
//! defaults are attached by the pipeline at dispatch time. The `retried`
//! marker enforces the single refresh-and-retry cycle: it starts `false`
//! and is set exactly once when the request is resubmitted after a refresh.

use crate::error::{ApiError, Result};
use bridge_traits::http::HttpMethod;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;

/// An outgoing HTTP call, before pipeline decoration.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Set when this descriptor is resubmitted after a token refresh. A
    /// descriptor that comes back unauthorized a second time is terminal.
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attaches a JSON body. The `Content-Type` header is left to the
    /// pipeline, which defaults it to JSON unless the caller said otherwise.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json =
            serde_json::to_vec(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(Bytes::from(json));
        Ok(self)
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Case-insensitive check for an explicitly set header.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the caller declared a multipart body. Such requests keep
    /// their content type; the JSON default must not apply.
    pub(crate) fn is_multipart(&self) -> bool {
        self.header_value("Content-Type")
            .map(|ct| ct.to_ascii_lowercase().contains("multipart/form-data"))
            .unwrap_or(false)
    }

    /// Replaces any Authorization header with a bearer token. Used when a
    /// request is resubmitted with the freshly minted access token.
    pub(crate) fn set_bearer(&mut self, token: &str) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case("authorization"));
        self.headers
            .insert("Authorization".to_string(), format!("Bearer {}", token));
    }
}
