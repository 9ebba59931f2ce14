//! OAuth 2.0 credential lifecycle for the Atlas identity provider.
//!
//! Manages a single bearer credential per environment: persist it, keep it
//! fresh through the refresh-token grant, fall back to interactive PKCE
//! login when the provider demands a human, and wrap upstream calls with
//! 401-driven recovery.
//!
//! # Components
//!
//! - [`store`] — Durable token records, one file per environment
//! - [`policy`] — Age-based staleness decisions
//! - [`oauth`] — Protocol plumbing: PKCE, authorization URL, grants
//! - [`refresh`] — Non-interactive renewal via the refresh-token grant
//! - [`interactive`] — PKCE login flow behind a pluggable [`LoginDriver`]
//! - [`notify`] — One-way operator notifications (MFA approval numbers)
//! - [`executor`] — Request orchestration: recover on 401, retry once

pub mod error;
pub mod executor;
pub mod interactive;
pub mod notify;
pub mod oauth;
pub mod policy;
pub mod refresh;
pub mod store;

pub use error::{AuthError, Result};
pub use executor::{RequestExecutor, UpstreamError};
pub use interactive::{
    DEFAULT_LOGIN_TIMEOUT, InteractiveAuthenticator, LoginContext, LoginDriver,
    OperatorCredentials, PkceAuthenticator,
};
pub use notify::{NullNotifier, OperatorNotifier, TelegramNotifier};
pub use oauth::{GrantResponse, PkceChallenge, ProviderConfig, TokenPair};
pub use policy::{AgePolicy, DEFAULT_MAX_AGE_HOURS};
pub use refresh::{RefreshExecutor, TokenRefresher};
pub use store::{TokenRecord, TokenStore};
