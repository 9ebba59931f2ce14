//! Authenticated request orchestration.
//!
//! [`RequestExecutor`] wraps an upstream call with the credential lifecycle:
//! pick a usable token (renewing a stale or missing one first), run the
//! call, and on a 401 recover the credential and retry exactly once. Every
//! attempt is recorded against the active record's bookkeeping.

use std::future::Future;
use std::sync::Arc;

use crate::error::{AuthError, Result};
use crate::interactive::{InteractiveAuthenticator, OperatorCredentials};
use crate::oauth::ProviderConfig;
use crate::policy::AgePolicy;
use crate::refresh::{RefreshExecutor, TokenRefresher};
use crate::store::TokenStore;

/// Outcome classification for a single upstream request attempt.
///
/// The closure handed to [`RequestExecutor::execute`] reduces its transport
/// library's outcome into this shape so the executor can decide between
/// recovering the credential, retrying, or surfacing the failure.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success HTTP status.
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl UpstreamError {
    /// Map a terminal attempt failure into the caller-facing error.
    fn into_auth(self) -> AuthError {
        match self {
            UpstreamError::Status {
                status: 401,
                message,
            } => AuthError::UpstreamAuth(message),
            UpstreamError::Status { status, message } => {
                AuthError::UpstreamHttp { status, message }
            }
            UpstreamError::Transport(message) => AuthError::Network(message),
        }
    }
}

/// Runs upstream requests under a managed credential.
#[derive(Debug)]
pub struct RequestExecutor {
    store: TokenStore,
    provider: ProviderConfig,
    credentials: OperatorCredentials,
    policy: AgePolicy,
    refresher: Arc<dyn TokenRefresher>,
    authenticator: Arc<dyn InteractiveAuthenticator>,
}

impl RequestExecutor {
    pub fn new(
        store: TokenStore,
        provider: ProviderConfig,
        credentials: OperatorCredentials,
        authenticator: Arc<dyn InteractiveAuthenticator>,
    ) -> Self {
        let refresher = Arc::new(RefreshExecutor::new(provider.clone()));
        Self {
            store,
            provider,
            credentials,
            policy: AgePolicy::default(),
            refresher,
            authenticator,
        }
    }

    /// Override the freshness policy.
    pub fn with_policy(mut self, policy: AgePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Swap the refresher. Tests script this seam; production keeps the
    /// grant-backed default.
    pub fn with_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = refresher;
        self
    }

    /// Read access to the underlying store, for status reporting.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Run `request` with a usable bearer token.
    ///
    /// The closure receives the token value and reports its outcome as an
    /// [`UpstreamError`] on failure. A 401 triggers credential recovery
    /// (refresh grant first, interactive login second) followed by at most
    /// one retry; if recovery fails the original rejection is surfaced.
    /// Non-401 failures are never retried.
    pub async fn execute<T, F, Fut>(&mut self, request: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, UpstreamError>>,
    {
        let token = self.usable_token().await?;

        match request(token).await {
            Ok(response) => {
                self.store.record_usage(true)?;
                Ok(response)
            }
            Err(UpstreamError::Status {
                status: 401,
                message,
            }) => {
                self.store.record_usage(false)?;
                tracing::warn!("upstream rejected credential with 401, attempting recovery");
                self.recover_and_retry(&request, message).await
            }
            Err(UpstreamError::Status { status, message }) => {
                self.store.record_usage(false)?;
                Err(AuthError::UpstreamHttp { status, message })
            }
            Err(UpstreamError::Transport(message)) => {
                self.store.record_usage(false)?;
                Err(AuthError::Network(message))
            }
        }
    }

    /// Resolve the token for the first attempt.
    ///
    /// A fresh active record is used as-is. A stale or missing one is
    /// renewed, refresh grant first, interactive login second; when both
    /// fail the request is never attempted.
    async fn usable_token(&mut self) -> Result<String> {
        if let Some(record) = self.store.active_record() {
            if !self.policy.is_stale(record) {
                tracing::debug!(id = record.id, "using active token");
                return Ok(record.value.clone());
            }
            tracing::info!(
                id = record.id,
                age_hours = AgePolicy::age_hours(record),
                "active token is stale, renewing before use"
            );
        } else {
            tracing::info!("no active token on file, acquiring one");
        }

        let refresher = Arc::clone(&self.refresher);
        match refresher.refresh(&mut self.store).await {
            Ok(()) => {
                if let Some(value) = self.store.active_value() {
                    return Ok(value.to_string());
                }
            }
            Err(e @ AuthError::Storage(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed, falling back to interactive login");
            }
        }

        match self
            .authenticator
            .authenticate(&self.credentials, &self.provider)
            .await
        {
            Ok(pair) => {
                self.store.add_token(&pair.access, Some(&pair.refresh))?;
                Ok(pair.access)
            }
            Err(e) => Err(AuthError::NoCredential(format!(
                "refresh and interactive login both failed: {e}"
            ))),
        }
    }

    /// 401 recovery: refresh grant first, interactive login second, at most
    /// one retry of the request either way. When neither path yields a new
    /// credential the original rejection is surfaced.
    async fn recover_and_retry<T, F, Fut>(&mut self, request: &F, original: String) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, UpstreamError>>,
    {
        let refresher = Arc::clone(&self.refresher);
        match refresher.refresh(&mut self.store).await {
            Ok(()) => {
                tracing::info!("credential refreshed, retrying request");
                return self.retry_once(request).await;
            }
            Err(e @ AuthError::Storage(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed, falling back to interactive login");
            }
        }

        match self
            .authenticator
            .authenticate(&self.credentials, &self.provider)
            .await
        {
            Ok(pair) => {
                self.store.add_token(&pair.access, Some(&pair.refresh))?;
                tracing::info!("interactive authentication succeeded, retrying request");
                self.retry_once(request).await
            }
            Err(e) => {
                tracing::error!(error = %e, "credential recovery failed, surfacing original rejection");
                Err(AuthError::UpstreamAuth(original))
            }
        }
    }

    /// Single retry after recovery. The retry's own failure is final.
    async fn retry_once<T, F, Fut>(&mut self, request: &F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, UpstreamError>>,
    {
        let token = self
            .store
            .active_value()
            .map(str::to_string)
            .ok_or_else(|| {
                AuthError::NoCredential("active record disappeared before retry".to_string())
            })?;

        match request(token).await {
            Ok(response) => {
                self.store.record_usage(true)?;
                Ok(response)
            }
            Err(err) => {
                self.store.record_usage(false)?;
                Err(err.into_auth())
            }
        }
    }
}
