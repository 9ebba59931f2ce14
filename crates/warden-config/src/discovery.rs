//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/warden/config.toml` (XDG user config)
//! 2. `./warden.toml` (project-local)
//! 3. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, WardenConfig};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "warden.toml";

/// Default config filename within XDG config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "warden";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: WardenConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (e.g., unreadable layers).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
///
/// Searches for config files in order:
/// 1. User config dir (from `WARDEN_CONFIG_DIR` env, or platform default)
/// 2. Project-local (`./warden.toml` or specified project dir)
///
/// Later files override earlier ones.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `WARDEN_CONFIG_DIR` and the platform default.
/// Pass `Some(path)` to use a specific directory, or `None` to use the default resolution.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = WardenConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    // 1. User config — explicit override, then env var, then platform default
    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => xdg_config_path(),
    };
    if let Some(path) = user_config_path {
        let source = load_layer(&mut config, &path, &mut warnings)?;
        sources.push(source);
    }

    // 2. Project-local config
    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    let source = load_layer(&mut config, &project_path, &mut warnings)?;
    sources.push(source);

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<WardenConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    WardenConfig::from_toml(&contents)
}

/// Save configuration to a file.
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &WardenConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Environment variable to override the config directory.
///
/// When set, this takes precedence over the platform default (XDG/Application Support).
/// Useful for testing and running multiple instances with different configs.
const CONFIG_DIR_ENV: &str = "WARDEN_CONFIG_DIR";

/// Get the XDG config file path for warden.
///
/// Checks `WARDEN_CONFIG_DIR` env var first, then falls back to platform default
/// (`~/.config/warden/config.toml` on Linux, `~/Library/Application Support/warden/config.toml` on macOS).
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the XDG config directory for warden.
///
/// Checks `WARDEN_CONFIG_DIR` env var first, then falls back to platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Directory holding the per-environment token files.
///
/// `[storage] dir` overrides; otherwise `tokens/` under the config directory.
pub fn token_dir(config: &WardenConfig) -> Option<PathBuf> {
    if let Some(dir) = config.storage.as_ref().and_then(|s| s.dir.clone()) {
        return Some(dir);
    }
    xdg_config_dir().map(|d| d.join("tokens"))
}

/// Try to load a config file and merge it into the existing config.
fn load_layer(
    config: &mut WardenConfig,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<ConfigSource> {
    if !path.is_file() {
        return Ok(ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        });
    }

    match load_config_file(path) {
        Ok(layer) => {
            config.merge(layer);
            Ok(ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            })
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            Ok(ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
