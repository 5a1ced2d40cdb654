// ============================================================================
// ERRORS - one enum per external dependency
// ============================================================================

use thiserror::Error;

/// Failures of the identity/session service.
///
/// The `Display` text is what a form shows in its error banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for this email")]
    EmailInUse,

    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Could not write user profile: {0}")]
    Profile(#[from] DocumentError),
}

impl AuthError {
    /// Maps a Firebase Auth REST error code (`error.message`) to a variant.
    ///
    /// Codes may carry a detail suffix, e.g. `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_provider_code(message: &str) -> Self {
        let (code, detail) = match message.split_once(':') {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };

        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidCredentials
            }
            "EMAIL_EXISTS" => Self::EmailInUse,
            "WEAK_PASSWORD" => Self::WeakPassword(if detail.is_empty() {
                "password rejected".to_string()
            } else {
                detail.to_string()
            }),
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "INVALID_ID_TOKEN" => {
                Self::NotSignedIn
            }
            _ => Self::Provider(message.trim().to_string()),
        }
    }
}

/// Failures of the per-user document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode document: {0}")]
    Decode(String),
}

impl From<AuthError> for DocumentError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotSignedIn => Self::Unauthenticated,
            AuthError::Network(msg) => Self::Network(msg),
            other => Self::PermissionDenied(other.to_string()),
        }
    }
}

/// Failures of the read-only market-data endpoints.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {message}")]
    Status {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned an unexpected payload: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Request was cancelled")]
    Cancelled,
}

/// Failures of the local key/value persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,

    #[error("Could not serialize value: {0}")]
    Serialize(String),

    #[error("Could not write to storage: {0}")]
    Write(String),
}
