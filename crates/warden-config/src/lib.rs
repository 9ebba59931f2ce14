//! Configuration system for the warden credential manager.
//!
//! Provides TOML-based configuration with:
//! - Config file layering (XDG user config + project-local overrides)
//! - Per-environment endpoint sections (`[env.staging]`, `[env.production]`)
//! - Baked-in defaults for the two built-in environments
//! - Secrets sourced from the process environment, never from files

pub mod discovery;
pub mod error;
pub mod resolver;
pub mod secrets;
pub mod types;

pub use discovery::{
    load_config, load_config_file, load_config_with_options, save_config, token_dir,
    xdg_config_dir, xdg_config_path, ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use resolver::{
    resolve_environment, ResolvedEnvironment, DEFAULT_ENVIRONMENT, PRODUCTION, STAGING,
};
pub use secrets::{operator_credentials, telegram_settings};
pub use types::*;
