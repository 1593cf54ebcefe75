//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per platform (desktop, iOS, Android).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Raw async HTTP transport (no credential
//!   handling; the request pipeline lives in `core-api`)
//! - [`SecureStore`](storage::SecureStore) - Credential persistence
//!   (Keychain/Keystore)
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. A
//! transport `Err` means no HTTP response was received at all; the core
//! treats that as a distinct, non-retriable error class. Platform
//! implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Map transport timeouts to `BridgeError::TimedOut`
//! - Provide actionable error messages
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent usage
//! across async tasks. Implementations must ensure thread safety.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::SecureStore;
