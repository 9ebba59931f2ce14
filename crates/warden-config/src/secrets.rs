//! Secrets resolution from the process environment.
//!
//! Operator credentials and the notification bot token never live in config
//! files; they are read from the environment at startup. Only the Telegram
//! chat id may fall back to the `[notify]` section.

use crate::{ConfigError, Result};

/// Operator username for the provider's login form.
pub const USERNAME_ENV: &str = "WARDEN_USERNAME";

/// Operator password for the provider's login form.
pub const PASSWORD_ENV: &str = "WARDEN_PASSWORD";

/// Telegram bot token for operator notifications.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Telegram chat id for operator notifications.
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Read a non-empty environment variable.
fn non_empty(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Operator credentials `(username, password)` from the environment.
///
/// Both are required for any flow that can reach interactive login.
pub fn operator_credentials() -> Result<(String, String)> {
    let username = non_empty(USERNAME_ENV).ok_or(ConfigError::MissingSecret {
        env_var: USERNAME_ENV.to_string(),
    })?;
    let password = non_empty(PASSWORD_ENV).ok_or(ConfigError::MissingSecret {
        env_var: PASSWORD_ENV.to_string(),
    })?;
    Ok((username, password))
}

/// Telegram settings `(bot_token, chat_id)`, when fully configured.
///
/// The bot token must come from the environment; the chat id is taken from
/// the environment first, then from the `[notify]` config section. Returns
/// `None` when either half is missing, in which case notifications are
/// silently disabled.
pub fn telegram_settings(config_chat_id: Option<&str>) -> Option<(String, String)> {
    let bot_token = non_empty(BOT_TOKEN_ENV)?;
    let chat_id = non_empty(CHAT_ID_ENV).or_else(|| config_chat_id.map(str::to_string))?;
    Some((bot_token, chat_id))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // These tests read the real process environment, so they only assert
    // behavior that holds whether or not the variables happen to be set.

    #[test]
    fn test_operator_credentials_requires_both() {
        match operator_credentials() {
            Ok((username, password)) => {
                assert!(!username.is_empty());
                assert!(!password.is_empty());
            }
            Err(e) => assert!(matches!(e, ConfigError::MissingSecret { .. })),
        }
    }

    #[test]
    fn test_telegram_settings_without_bot_token() {
        if std::env::var(BOT_TOKEN_ENV).is_err() {
            assert!(telegram_settings(Some("12345")).is_none());
        }
    }

    #[test]
    fn test_missing_secret_message_names_variable() {
        let err = ConfigError::MissingSecret {
            env_var: USERNAME_ENV.to_string(),
        };
        assert!(err.to_string().contains("WARDEN_USERNAME"));
    }
}
