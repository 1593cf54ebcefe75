use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Operation timed out: {0}")]
    TimedOut(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this error represents a transport timeout rather than a
    /// connection-level failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::TimedOut(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
