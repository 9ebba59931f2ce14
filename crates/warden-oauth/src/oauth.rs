//! OAuth 2.0 protocol pieces: provider endpoints, PKCE, token grants.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{AuthError, Result};

/// Timeout applied to every token-endpoint call.
const GRANT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Provider configuration
// ============================================================================

/// Identity-provider endpoints and client registration for one environment.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub auth_base_url: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::staging()
    }
}

impl ProviderConfig {
    /// Registration against the staging identity provider.
    pub fn staging() -> Self {
        Self {
            client_id: "Atlas_App".to_string(),
            auth_base_url: "https://staging-atlas-auth.rickshawnetwork.com".to_string(),
            redirect_uri: "https://staging-atlas.rickshawnetwork.com".to_string(),
            scope: "openid profile email offline_access".to_string(),
        }
    }

    /// Registration against the production identity provider.
    pub fn production() -> Self {
        Self {
            client_id: "Atlas_App".to_string(),
            auth_base_url: "https://atlas-auth.rickshawnetwork.com".to_string(),
            redirect_uri: "https://atlas.rickshawnetwork.com".to_string(),
            scope: "openid profile email offline_access".to_string(),
        }
    }

    /// Token endpoint URL.
    pub fn token_url(&self) -> String {
        format!("{}/connect/token", self.auth_base_url)
    }

    /// Build the authorization request URL for a PKCE challenge.
    pub fn authorization_url(&self, challenge: &str) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("scope", self.scope.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code_challenge", challenge),
            ("code_challenge_method", "S256"),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}/connect/authorize?{}", self.auth_base_url, query)
    }
}

// ============================================================================
// PKCE
// ============================================================================

/// PKCE code verifier and challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new PKCE pair.
    ///
    /// 64 random bytes encode to an 86-character verifier, comfortably above
    /// RFC 7636's 43-character minimum.
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; 64];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);
        Self::from_verifier(&verifier)
    }

    /// Derive the S256 challenge for an existing verifier.
    pub fn from_verifier(verifier: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

        Self {
            verifier: verifier.to_string(),
            challenge,
        }
    }
}

// ============================================================================
// Token grants
// ============================================================================

/// Token-endpoint response body.
///
/// Both fields are optional on the wire; callers decide which absences are
/// failures (refresh requires a new access token, the interactive exchange
/// requires both).
#[derive(Debug, Clone, Deserialize)]
pub struct GrantResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A complete access/refresh credential pair minted by interactive login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Exchange an authorization code for a full credential pair.
pub async fn exchange_code(
    provider: &ProviderConfig,
    code: &str,
    verifier: &str,
) -> Result<TokenPair> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", provider.redirect_uri.as_str()),
        ("code_verifier", verifier),
        ("client_id", provider.client_id.as_str()),
    ];

    let response = reqwest::Client::new()
        .post(provider.token_url())
        .form(&params)
        .timeout(GRANT_TIMEOUT)
        .send()
        .await
        .map_err(|e| AuthError::Network(format!("code exchange request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Provider(format!(
            "code exchange returned {}: {}",
            status, body
        )));
    }

    let grant: GrantResponse = response
        .json()
        .await
        .map_err(|e| AuthError::Provider(format!("unparseable exchange response: {}", e)))?;

    let access = grant
        .access_token
        .ok_or_else(|| AuthError::Provider("no access token in exchange response".to_string()))?;
    let refresh = grant
        .refresh_token
        .ok_or_else(|| AuthError::Provider("no refresh token in exchange response".to_string()))?;

    Ok(TokenPair { access, refresh })
}

/// Run the refresh-token grant.
///
/// Returns the raw response; the provider may rotate the refresh token or
/// omit it to mean "keep using the old one".
pub async fn refresh_grant(provider: &ProviderConfig, refresh_token: &str) -> Result<GrantResponse> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", provider.client_id.as_str()),
        ("scope", provider.scope.as_str()),
    ];

    let response = reqwest::Client::new()
        .post(provider.token_url())
        .form(&params)
        .timeout(GRANT_TIMEOUT)
        .send()
        .await
        .map_err(|e| AuthError::Network(format!("refresh request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Provider(format!(
            "refresh grant returned {}: {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::Provider(format!("unparseable refresh response: {}", e)))
}

/// Pull the authorization code out of the redirect URL.
///
/// The redirect landing on the configured URI with a `code` query parameter
/// is the sole success signal of the interactive phase.
pub fn extract_code(redirect_url: &str) -> Result<String> {
    let query = redirect_url
        .split_once('?')
        .map(|(_, q)| q)
        .unwrap_or_default();
    let query = query.split_once('#').map(|(q, _)| q).unwrap_or(query);

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key == "code" && !value.is_empty() {
            let decoded = urlencoding::decode(value).map_err(|e| {
                AuthError::InteractiveAuthFailed(format!("malformed authorization code: {}", e))
            })?;
            return Ok(decoded.into_owned());
        }
    }

    Err(AuthError::InteractiveAuthFailed(
        "redirect contained no authorization code".to_string(),
    ))
}
