//! CLI command handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use warden_config::{ResolvedEnvironment, WardenConfig};
use warden_oauth::{
    AgePolicy, InteractiveAuthenticator, NullNotifier, OperatorCredentials, OperatorNotifier,
    PkceAuthenticator, ProviderConfig, TelegramNotifier, TokenStore,
};

use crate::driver::ManualLoginDriver;

pub mod call;
pub mod login;
pub mod refresh;
pub mod status;
pub mod tokens;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Fully-resolved settings for the selected environment.
    pub environment: ResolvedEnvironment,
    /// The merged configuration (notification channel, storage, ...).
    pub config: WardenConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Provider registration for the selected environment.
    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            client_id: self.environment.client_id.clone(),
            auth_base_url: self.environment.auth_base_url.clone(),
            redirect_uri: self.environment.redirect_uri.clone(),
            scope: self.environment.scope.clone(),
        }
    }

    /// Freshness policy for the selected environment.
    pub fn policy(&self) -> AgePolicy {
        AgePolicy::new(self.environment.max_age_hours)
    }

    /// Open the token store for the selected environment.
    pub fn open_store(&self) -> Result<TokenStore> {
        let dir = warden_config::token_dir(&self.config)
            .ok_or_else(|| anyhow::anyhow!("Could not determine a token directory"))?;
        Ok(TokenStore::open(&dir, &self.environment.name))
    }

    /// Operator notification channel, when configured.
    pub fn notifier(&self) -> Arc<dyn OperatorNotifier> {
        let config_chat_id = self
            .config
            .notify
            .as_ref()
            .and_then(|n| n.chat_id.as_deref());
        match warden_config::telegram_settings(config_chat_id) {
            Some((bot_token, chat_id)) => Arc::new(TelegramNotifier::new(bot_token, chat_id)),
            None => Arc::new(NullNotifier),
        }
    }

    /// Interactive authenticator driving the operator's own browser.
    pub fn authenticator(&self) -> Arc<dyn InteractiveAuthenticator> {
        let authenticator = PkceAuthenticator::new(Arc::new(ManualLoginDriver), self.notifier())
            .with_login_timeout(Duration::from_secs(self.environment.login_timeout_secs));
        Arc::new(authenticator)
    }

    /// Operator credentials from the environment.
    ///
    /// The manual login driver does not need them (the operator signs in
    /// through the browser), so absence is tolerated here; automated
    /// drivers fail the login instead.
    pub fn credentials(&self) -> OperatorCredentials {
        match warden_config::operator_credentials() {
            Ok((username, password)) => OperatorCredentials::new(username, password),
            Err(e) => {
                tracing::debug!(error = %e, "operator credentials not set, continuing without");
                OperatorCredentials::new("", "")
            }
        }
    }
}

/// Mask a token value for display: first and last four characters.
pub(crate) fn mask(value: &str) -> String {
    if value.len() > 8 {
        format!("{}...{}", &value[..4], &value[value.len() - 4..])
    } else {
        "****".to_string()
    }
}
