//! Environment resolution: turn layered config into concrete settings.
//!
//! Selection precedence: explicit name (CLI flag), then the top-level
//! `environment` key, then staging. The two built-in environments carry
//! complete endpoint defaults; any other name must supply a full
//! `[env.<name>]` section.

use crate::{ConfigError, Result, WardenConfig};

/// Built-in environment names.
pub const STAGING: &str = "staging";
pub const PRODUCTION: &str = "production";

/// Environment assumed when nothing selects one.
pub const DEFAULT_ENVIRONMENT: &str = STAGING;

const DEFAULT_CLIENT_ID: &str = "Atlas_App";
const DEFAULT_SCOPE: &str = "openid profile email offline_access";
const DEFAULT_MAX_AGE_HOURS: i64 = 24;
const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 60;

/// Fully-resolved settings for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    pub name: String,
    pub client_id: String,
    pub scope: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub redirect_uri: String,
    pub max_age_hours: i64,
    pub login_timeout_secs: u64,
}

/// Baked-in endpoints for the built-in environments.
fn builtin_endpoints(name: &str) -> Option<(&'static str, &'static str, &'static str)> {
    match name {
        STAGING => Some((
            "https://staging-atlas-auth.rickshawnetwork.com",
            "https://staging-atlas-api.rickshawnetwork.com",
            "https://staging-atlas.rickshawnetwork.com",
        )),
        PRODUCTION => Some((
            "https://atlas-auth.rickshawnetwork.com",
            "https://atlas-api.rickshawnetwork.com",
            "https://atlas.rickshawnetwork.com",
        )),
        _ => None,
    }
}

/// Resolve the settings for `name`, or for the configured default
/// environment when `name` is `None`.
pub fn resolve_environment(
    config: &WardenConfig,
    name: Option<&str>,
) -> Result<ResolvedEnvironment> {
    let name = name
        .or(config.environment.as_deref())
        .unwrap_or(DEFAULT_ENVIRONMENT)
        .to_string();

    let section = config.environments.get(&name);
    let builtin = builtin_endpoints(&name);

    let auth_base_url = section
        .and_then(|s| s.auth_base_url.clone())
        .or_else(|| builtin.map(|(auth, _, _)| auth.to_string()))
        .ok_or_else(|| missing(&name, "auth_base_url"))?;
    let api_base_url = section
        .and_then(|s| s.api_base_url.clone())
        .or_else(|| builtin.map(|(_, api, _)| api.to_string()))
        .ok_or_else(|| missing(&name, "api_base_url"))?;
    let redirect_uri = section
        .and_then(|s| s.redirect_uri.clone())
        .or_else(|| builtin.map(|(_, _, redirect)| redirect.to_string()))
        .ok_or_else(|| missing(&name, "redirect_uri"))?;

    let auth = config.auth.as_ref();
    Ok(ResolvedEnvironment {
        name,
        client_id: auth
            .and_then(|a| a.client_id.clone())
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
        scope: auth
            .and_then(|a| a.scope.clone())
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
        auth_base_url,
        api_base_url,
        redirect_uri,
        max_age_hours: auth
            .and_then(|a| a.max_age_hours)
            .unwrap_or(DEFAULT_MAX_AGE_HOURS),
        login_timeout_secs: auth
            .and_then(|a| a.login_timeout_secs)
            .unwrap_or(DEFAULT_LOGIN_TIMEOUT_SECS),
    })
}

fn missing(environment: &str, field: &str) -> ConfigError {
    ConfigError::MissingField {
        field: field.to_string(),
        context: format!("[env.{environment}]"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_staging() {
        let resolved = resolve_environment(&WardenConfig::new(), None).unwrap();
        assert_eq!(resolved.name, "staging");
        assert_eq!(
            resolved.auth_base_url,
            "https://staging-atlas-auth.rickshawnetwork.com"
        );
        assert_eq!(
            resolved.api_base_url,
            "https://staging-atlas-api.rickshawnetwork.com"
        );
        assert_eq!(
            resolved.redirect_uri,
            "https://staging-atlas.rickshawnetwork.com"
        );
        assert_eq!(resolved.client_id, "Atlas_App");
        assert_eq!(resolved.scope, "openid profile email offline_access");
        assert_eq!(resolved.max_age_hours, 24);
        assert_eq!(resolved.login_timeout_secs, 60);
    }

    #[test]
    fn test_resolve_production_by_name() {
        let resolved = resolve_environment(&WardenConfig::new(), Some("production")).unwrap();
        assert_eq!(resolved.name, "production");
        assert_eq!(
            resolved.auth_base_url,
            "https://atlas-auth.rickshawnetwork.com"
        );
        assert_eq!(resolved.api_base_url, "https://atlas-api.rickshawnetwork.com");
        assert_eq!(resolved.client_id, "Atlas_App");
    }

    #[test]
    fn test_config_key_selects_environment() {
        let config = WardenConfig::from_toml(r#"environment = "production""#).unwrap();
        let resolved = resolve_environment(&config, None).unwrap();
        assert_eq!(resolved.name, "production");
    }

    #[test]
    fn test_explicit_name_beats_config_key() {
        let config = WardenConfig::from_toml(r#"environment = "production""#).unwrap();
        let resolved = resolve_environment(&config, Some("staging")).unwrap();
        assert_eq!(resolved.name, "staging");
    }

    #[test]
    fn test_section_overrides_builtin_endpoint() {
        let config = WardenConfig::from_toml(
            r#"
[env.staging]
auth_base_url = "https://auth.override.example"
"#,
        )
        .unwrap();

        let resolved = resolve_environment(&config, Some("staging")).unwrap();
        assert_eq!(resolved.auth_base_url, "https://auth.override.example");
        // Untouched fields keep their defaults.
        assert_eq!(
            resolved.api_base_url,
            "https://staging-atlas-api.rickshawnetwork.com"
        );
    }

    #[test]
    fn test_auth_section_overrides() {
        let config = WardenConfig::from_toml(
            r#"
[auth]
client_id = "Custom_App"
max_age_hours = 6
"#,
        )
        .unwrap();

        let resolved = resolve_environment(&config, None).unwrap();
        assert_eq!(resolved.client_id, "Custom_App");
        assert_eq!(resolved.max_age_hours, 6);
        assert_eq!(resolved.scope, "openid profile email offline_access");
    }

    #[test]
    fn test_unknown_environment_requires_full_section() {
        let err = resolve_environment(&WardenConfig::new(), Some("qa")).unwrap_err();
        match err {
            ConfigError::MissingField { field, context } => {
                assert_eq!(field, "auth_base_url");
                assert_eq!(context, "[env.qa]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_environment_with_full_section() {
        let config = WardenConfig::from_toml(
            r#"
[env.qa]
auth_base_url = "https://auth.qa.example"
api_base_url = "https://api.qa.example"
redirect_uri = "https://app.qa.example"
"#,
        )
        .unwrap();

        let resolved = resolve_environment(&config, Some("qa")).unwrap();
        assert_eq!(resolved.name, "qa");
        assert_eq!(resolved.auth_base_url, "https://auth.qa.example");
    }

    #[test]
    fn test_unknown_environment_partial_section_names_missing_field() {
        let config = WardenConfig::from_toml(
            r#"
[env.qa]
auth_base_url = "https://auth.qa.example"
"#,
        )
        .unwrap();

        let err = resolve_environment(&config, Some("qa")).unwrap_err();
        match err {
            ConfigError::MissingField { field, .. } => assert_eq!(field, "api_base_url"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
