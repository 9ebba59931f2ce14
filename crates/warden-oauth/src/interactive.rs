//! Interactive re-authentication.
//!
//! The full flow: generate a PKCE challenge, open the provider's
//! authorization URL, let a [`LoginDriver`] complete the login form and the
//! MFA approval, capture the redirect carrying the authorization code, and
//! exchange the code for a fresh token pair. The human approval step means
//! the whole wait is bounded by a hard timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AuthError, Result};
use crate::notify::OperatorNotifier;
use crate::oauth::{PkceChallenge, ProviderConfig, TokenPair, exchange_code, extract_code};

/// Default bound on the interactive login wait, MFA approval included.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Operator credentials for the provider's login form.
#[derive(Clone)]
pub struct OperatorCredentials {
    pub username: String,
    pub password: String,
}

impl OperatorCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for OperatorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Mints a fresh credential pair through the provider's interactive flow.
///
/// Implementations own the whole round trip, authorization request through
/// code exchange. The minted pair is handed back to the caller, which stores
/// it and thereby deactivates every prior record.
#[async_trait]
pub trait InteractiveAuthenticator: Send + Sync + std::fmt::Debug {
    async fn authenticate(
        &self,
        credentials: &OperatorCredentials,
        provider: &ProviderConfig,
    ) -> Result<TokenPair>;
}

/// Everything a login driver needs to complete the provider's UI flow.
pub struct LoginContext<'a> {
    /// Authorization URL to open, PKCE challenge included.
    pub authorize_url: &'a str,
    pub credentials: &'a OperatorCredentials,
    /// Channel for relaying the MFA approval number to the operator.
    pub notifier: &'a dyn OperatorNotifier,
    /// How long the driver may wait for the code-bearing redirect.
    pub timeout: Duration,
}

/// Drives the provider's login UI.
///
/// The protocol side (PKCE, code capture, exchange) lives in
/// [`PkceAuthenticator`]; the driver only has to get the operator through
/// the login form and MFA, then return the redirect URL carrying `code=`.
/// When the provider displays an approval number, the driver relays it
/// through [`LoginContext::notifier`].
#[async_trait]
pub trait LoginDriver: Send + Sync + std::fmt::Debug {
    async fn complete_login(&self, login: &LoginContext<'_>) -> Result<String>;
}

/// Authorization-code flow with PKCE around a pluggable login driver.
#[derive(Debug, Clone)]
pub struct PkceAuthenticator {
    driver: Arc<dyn LoginDriver>,
    notifier: Arc<dyn OperatorNotifier>,
    login_timeout: Duration,
}

impl PkceAuthenticator {
    pub fn new(driver: Arc<dyn LoginDriver>, notifier: Arc<dyn OperatorNotifier>) -> Self {
        Self {
            driver,
            notifier,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }

    /// Override the bound on the interactive wait.
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }
}

#[async_trait]
impl InteractiveAuthenticator for PkceAuthenticator {
    async fn authenticate(
        &self,
        credentials: &OperatorCredentials,
        provider: &ProviderConfig,
    ) -> Result<TokenPair> {
        let pkce = PkceChallenge::generate();
        let authorize_url = provider.authorization_url(&pkce.challenge);
        tracing::info!(username = %credentials.username, "starting interactive authentication");

        let login = LoginContext {
            authorize_url: &authorize_url,
            credentials,
            notifier: self.notifier.as_ref(),
            timeout: self.login_timeout,
        };

        // Hard bound on the whole human-in-the-loop wait. The driver gets
        // the same figure for its own internal polling.
        let redirect = tokio::time::timeout(self.login_timeout, self.driver.complete_login(&login))
            .await
            .map_err(|_| {
                AuthError::InteractiveAuthFailed(format!(
                    "login did not complete within {}s",
                    self.login_timeout.as_secs()
                ))
            })?
            .map_err(|e| match e {
                e @ AuthError::InteractiveAuthFailed(_) => e,
                other => AuthError::InteractiveAuthFailed(other.to_string()),
            })?;

        let code = extract_code(&redirect)?;
        tracing::debug!("authorization code captured, exchanging");

        let pair = exchange_code(provider, &code, &pkce.verifier)
            .await
            .map_err(|e| match e {
                e @ AuthError::InteractiveAuthFailed(_) => e,
                other => AuthError::InteractiveAuthFailed(other.to_string()),
            })?;

        tracing::info!("interactive authentication succeeded");
        Ok(pair)
    }
}
