//! # API Client
//!
//! The authenticated HTTP client for the Restaurant Client Core.
//!
//! ## Overview
//!
//! This crate owns the request pipeline: outbound credential decoration,
//! inbound classification, and the part everything else leans on: the
//! single-flight token refresh protocol. When several in-flight requests hit
//! an expired access token at once, exactly one refresh call goes out;
//! every affected request is resubmitted once with the new token, in FIFO
//! order, and a request that fails unauthorized a second time is terminal.
//!
//! ## Features
//!
//! - Bearer/API-key header injection with caller override
//! - Single-flight refresh coordination with FIFO waiter fan-out
//! - Tolerant multi-shape token extraction (see [`extract`])
//! - Uniform error taxonomy distinguishing transport, status and refresh
//!   failures (see [`ApiError`])
//!
//! ## Usage
//!
//! ```no_run
//! use core_api::{endpoints, ApiClient, ApiRequest};
//! use core_auth::TokenStore;
//! use core_runtime::{config::ApiConfig, events::EventBus};
//! use std::sync::Arc;
//! # use bridge_traits::{HttpClient, SecureStore};
//!
//! # async fn example(transport: Arc<dyn HttpClient>, store: Arc<dyn SecureStore>) -> core_api::Result<()> {
//! let config = ApiConfig::builder()
//!     .base_url("https://api.example.com")
//!     .build()
//!     .expect("config");
//!
//! let client = ApiClient::new(config, transport, TokenStore::new(store), EventBus::new(100));
//! let response = client.send(ApiRequest::get(endpoints::ITEM_BEST_SELLER)).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod extract;
pub mod refresh;
pub mod request;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use request::ApiRequest;
