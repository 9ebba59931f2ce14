//! Refresh-token grant execution against the identity provider.

use async_trait::async_trait;

use crate::error::{AuthError, Result};
use crate::oauth::{ProviderConfig, refresh_grant};
use crate::store::TokenStore;

/// Capability to renew the active credential without operator involvement.
///
/// The request executor only needs this seam; swapping in a scripted
/// implementation is how the retry orchestration is tested offline.
#[async_trait]
pub trait TokenRefresher: Send + Sync + std::fmt::Debug {
    /// Refresh the active record in place.
    ///
    /// A `RefreshFailed` error means "fall back to interactive login";
    /// `Storage` errors are real faults and propagate.
    async fn refresh(&self, store: &mut TokenStore) -> Result<()>;
}

/// Production refresher: runs the provider's refresh-token grant and updates
/// the active record in place, preserving its id.
#[derive(Debug, Clone)]
pub struct RefreshExecutor {
    provider: ProviderConfig,
}

impl RefreshExecutor {
    pub fn new(provider: ProviderConfig) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TokenRefresher for RefreshExecutor {
    async fn refresh(&self, store: &mut TokenStore) -> Result<()> {
        let Some(refresh_token) = store.active_refresh().map(str::to_string) else {
            return Err(AuthError::RefreshFailed(
                "no refresh token on the active record".to_string(),
            ));
        };

        tracing::info!("attempting refresh-token grant");
        let grant = match refresh_grant(&self.provider, &refresh_token).await {
            Ok(grant) => grant,
            // Transport failures and provider rejections both degrade to a
            // refresh failure; the caller falls back to interactive login.
            Err(e) => return Err(AuthError::RefreshFailed(e.to_string())),
        };

        let Some(access) = grant.access_token else {
            return Err(AuthError::RefreshFailed(
                "no access token in refresh response".to_string(),
            ));
        };

        if !store.update_active(&access, grant.refresh_token.as_deref())? {
            return Err(AuthError::RefreshFailed(
                "no active record to update".to_string(),
            ));
        }

        tracing::info!("access token refreshed in place");
        Ok(())
    }
}
