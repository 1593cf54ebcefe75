use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] core_api::ApiError),

    #[error(transparent)]
    Storage(#[from] core_auth::AuthError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
