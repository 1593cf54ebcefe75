//! # Authentication Primitives
//!
//! Credential types and secure token persistence for the Restaurant Client
//! Core.
//!
//! ## Overview
//!
//! This crate owns the durable side of the session: the typed
//! [`TokenStore`] over the platform's secure storage, and the data types the
//! rest of the core shares (login [`Credentials`], the cached [`AuthUser`]
//! profile, the in-memory [`Session`] snapshot). The behavior (hydrate,
//! login, logout, refresh) lives in `core-session` and `core-api`.

pub mod error;
pub mod token_store;
pub mod types;

pub use error::{AuthError, Result};
pub use token_store::TokenStore;
pub use types::{AuthUser, Credentials, Session};
