use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials.
///
/// The server accepts either an email address or a phone number together
/// with a password. Whichever identifier is absent is omitted from the
/// login payload.
///
/// # Security
///
/// The password is never logged. The `Debug` implementation redacts it.
///
/// # Examples
///
/// ```
/// use core_auth::Credentials;
///
/// let by_email = Credentials::with_email("chef@example.com", "secret");
/// let by_phone = Credentials::with_phone("+84901234567", "secret");
/// assert!(by_email.email.is_some());
/// assert!(by_phone.phone.is_some());
/// ```
#[derive(Clone, Serialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

impl Credentials {
    /// Credentials identified by email address.
    pub fn with_email(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            phone: None,
            password: password.into(),
        }
    }

    /// Credentials identified by phone number.
    pub fn with_phone(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: None,
            phone: Some(phone.into()),
            password: password.into(),
        }
    }
}

// Custom Debug implementation to avoid logging passwords
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The authenticated user profile.
///
/// The server's user object shape is not guaranteed, so only the commonly
/// present fields are typed; everything else is retained in `extra` and
/// round-trips through persistence unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AuthUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// In-memory snapshot of the authentication session.
///
/// This is a cache of the durable [`TokenStore`](crate::TokenStore) state
/// plus transient flags the UI layer drives from (`loading`, `last_error`).
///
/// # Invariants
///
/// `hydrated` becomes `true` exactly once per process lifetime, after the
/// initial load from the token store completes, whether it succeeded or
/// not. Until then the absence of a token says nothing about whether the
/// user is signed in.
#[derive(Clone, Default)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<AuthUser>,

    pub hydrated: bool,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl Session {
    /// Whether the session currently holds an access token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user", &self.user)
            .field("hydrated", &self.hydrated)
            .field("loading", &self.loading)
            .field("last_error", &self.last_error)
            .finish()
    }
}
