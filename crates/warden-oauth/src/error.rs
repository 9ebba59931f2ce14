//! Error types for the credential lifecycle core.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while managing or using credentials.
///
/// Only a subset is ever caller-visible: `RefreshFailed` and
/// `InteractiveAuthFailed` are absorbed by the request executor's fallback
/// chain unless the failing operation was invoked directly.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No active credential exists and no fallback produced one.
    #[error("no usable credential: {0}")]
    NoCredential(String),

    /// The refresh-token grant was rejected or could not be reached.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Interactive login, MFA approval, or code exchange failed or timed out.
    #[error("interactive authentication failed: {0}")]
    InteractiveAuthFailed(String),

    /// The upstream API rejected the call with 401 after all fallbacks.
    #[error("upstream rejected credential (401): {0}")]
    UpstreamAuth(String),

    /// The upstream API returned a non-401 error status.
    #[error("upstream HTTP {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    /// Network/transport error (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The identity provider returned an error or an unusable body.
    #[error("provider error: {0}")]
    Provider(String),

    /// Token store could not be persisted.
    #[error("token store error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}
