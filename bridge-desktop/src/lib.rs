//! # Desktop Bridge Implementations
//!
//! Desktop-ready adapters for the bridge traits:
//!
//! - [`ReqwestHttpClient`] - HTTP transport backed by reqwest
//! - [`KeyringSecureStore`] - credential storage backed by the OS keychain
//!   (enabled with the default `secure-store` feature)
//!
//! Mobile hosts ship their own adapters; these shims exist so the core can
//! run unmodified on desktop platforms and in integration tests.

pub mod http;
#[cfg(feature = "secure-store")]
pub mod secure_store;

pub use http::ReqwestHttpClient;
#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
