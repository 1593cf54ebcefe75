//! # Core Runtime
//!
//! Shared runtime infrastructure for the Restaurant Client Core:
//!
//! - [`events`] - typed event bus over `tokio::sync::broadcast`
//! - [`config`] - API client configuration with validation
//! - [`logging`] - `tracing` subscriber bootstrap
//! - [`error`] - runtime error type

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::ApiConfig;
pub use error::{Error, Result};
pub use events::{ApiEvent, AuthEvent, CoreEvent, EventBus, EventStream};
pub use logging::{init_logging, LogFormat, LoggingConfig};
