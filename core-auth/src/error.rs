use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Serialization failed for {context}: {reason}")]
    SerializationFailed { context: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AuthError>;
