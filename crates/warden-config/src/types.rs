//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! environment = "staging"  # which environment to operate against
//!
//! [auth]                   # provider registration overrides
//! [env.staging]            # per-environment endpoints
//! [env.production]
//! [notify]                 # operator notification channel
//! [storage]                # token state location
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// Maps to the full TOML config file. All sections are optional so that
/// partial configs (e.g., project-local overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Environment to operate against when no CLI or env override is given.
    pub environment: Option<String>,

    /// Provider registration settings shared across environments.
    pub auth: Option<AuthSection>,

    /// Per-environment endpoint sections (`[env.staging]`, `[env.production]`, ...).
    #[serde(default, rename = "env")]
    pub environments: HashMap<String, EnvironmentSection>,

    /// Operator notification channel.
    pub notify: Option<NotifySection>,

    /// Token state storage.
    pub storage: Option<StorageSection>,
}

impl WardenConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: WardenConfig) {
        if other.environment.is_some() {
            self.environment = other.environment;
        }

        if other.auth.is_some() {
            self.auth = other.auth;
        }

        for (name, section) in other.environments {
            self.environments.insert(name, section);
        }

        if other.notify.is_some() {
            self.notify = other.notify;
        }

        if other.storage.is_some() {
            self.storage = other.storage;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// The `[auth]` section: provider registration shared across environments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// OAuth client id registered with the provider.
    pub client_id: Option<String>,

    /// Scopes requested on every grant.
    pub scope: Option<String>,

    /// Hours before the active token is considered stale.
    pub max_age_hours: Option<i64>,

    /// Bound on the interactive login wait, in seconds.
    pub login_timeout_secs: Option<u64>,
}

/// One `[env.<name>]` section: endpoints for a single environment.
///
/// The built-in `staging` and `production` environments have baked-in
/// defaults; a section only needs the fields it overrides. Any other
/// environment name must supply all three.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    /// Identity provider base URL.
    pub auth_base_url: Option<String>,

    /// API base URL for authenticated calls.
    pub api_base_url: Option<String>,

    /// Redirect URI registered with the provider.
    pub redirect_uri: Option<String>,
}

/// The `[notify]` section.
///
/// Only the chat id lives here; the bot token always comes from the
/// process environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySection {
    /// Telegram chat to send MFA approval numbers to.
    pub chat_id: Option<String>,
}

/// The `[storage]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding the per-environment token files.
    pub dir: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = WardenConfig::from_toml(
            r#"
environment = "production"

[auth]
client_id = "Atlas_App"
max_age_hours = 12

[env.staging]
auth_base_url = "https://auth.staging.example"

[env.production]
auth_base_url = "https://auth.example"
api_base_url = "https://api.example"
redirect_uri = "https://app.example"

[notify]
chat_id = "123456"

[storage]
dir = "/var/lib/warden"
"#,
        )
        .unwrap();

        assert_eq!(config.environment.as_deref(), Some("production"));
        assert_eq!(
            config.auth.as_ref().unwrap().client_id.as_deref(),
            Some("Atlas_App")
        );
        assert_eq!(config.auth.as_ref().unwrap().max_age_hours, Some(12));
        assert_eq!(config.environments.len(), 2);
        assert_eq!(
            config.environments["staging"].auth_base_url.as_deref(),
            Some("https://auth.staging.example")
        );
        assert_eq!(
            config.notify.as_ref().unwrap().chat_id.as_deref(),
            Some("123456")
        );
        assert_eq!(
            config.storage.as_ref().unwrap().dir,
            Some(PathBuf::from("/var/lib/warden"))
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = WardenConfig::from_toml("").unwrap();
        assert!(config.environment.is_none());
        assert!(config.auth.is_none());
        assert!(config.environments.is_empty());
    }

    #[test]
    fn test_partial_sections_allowed() {
        let config = WardenConfig::from_toml(
            r#"
[auth]
max_age_hours = 48
"#,
        )
        .unwrap();

        let auth = config.auth.unwrap();
        assert_eq!(auth.max_age_hours, Some(48));
        assert!(auth.client_id.is_none());
        assert!(auth.scope.is_none());
    }

    #[test]
    fn test_merge_sections_override() {
        let mut base = WardenConfig::from_toml(
            r#"
environment = "staging"

[auth]
client_id = "Base_App"

[env.staging]
auth_base_url = "https://base.example"
"#,
        )
        .unwrap();

        let overlay = WardenConfig::from_toml(
            r#"
environment = "production"

[auth]
client_id = "Overlay_App"
max_age_hours = 6

[env.production]
auth_base_url = "https://overlay.example"
"#,
        )
        .unwrap();

        base.merge(overlay);

        assert_eq!(base.environment.as_deref(), Some("production"));
        // Sections replace wholesale; the overlay's auth wins.
        assert_eq!(
            base.auth.as_ref().unwrap().client_id.as_deref(),
            Some("Overlay_App")
        );
        // Environment sections merge per-name.
        assert_eq!(base.environments.len(), 2);
        assert_eq!(
            base.environments["staging"].auth_base_url.as_deref(),
            Some("https://base.example")
        );
    }

    #[test]
    fn test_merge_keeps_base_when_overlay_empty() {
        let mut base = WardenConfig::from_toml(
            r#"
environment = "staging"

[notify]
chat_id = "42"
"#,
        )
        .unwrap();

        base.merge(WardenConfig::new());

        assert_eq!(base.environment.as_deref(), Some("staging"));
        assert_eq!(base.notify.as_ref().unwrap().chat_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = WardenConfig::from_toml(
            r#"
environment = "staging"

[env.staging]
auth_base_url = "https://auth.staging.example"
"#,
        )
        .unwrap();

        let serialized = config.to_toml().unwrap();
        let reparsed = WardenConfig::from_toml(&serialized).unwrap();
        assert_eq!(reparsed.environment.as_deref(), Some("staging"));
        assert_eq!(
            reparsed.environments["staging"].auth_base_url.as_deref(),
            Some("https://auth.staging.example")
        );
    }
}
