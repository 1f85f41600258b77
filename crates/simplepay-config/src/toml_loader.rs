//! TOML config file loading and creation.

use std::path::{Path, PathBuf};

use simplepay_common::ConfigError;
use tracing::{info, warn};

use crate::schema::CheckoutConfig;
use crate::validation;

/// Load config from a specific TOML file path.
///
/// Missing fields take serde defaults. A file that parses but fails
/// validation is logged and replaced by the default config.
pub fn load_from_path(path: &Path) -> Result<CheckoutConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config: CheckoutConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
        warn!("falling back to default config");
        return Ok(CheckoutConfig::default());
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path, creating a
/// commented default file if none exists.
pub fn load_default() -> Result<CheckoutConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        create_default_config(&path)?;
        return Ok(CheckoutConfig::default());
    }

    load_from_path(&path)
}

/// On Linux: `~/.config/simplepay/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("simplepay").join("config.toml"))
}

/// Write the default TOML config (with documentation comments) to `path`.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}

const DEFAULT_CONFIG_TOML: &str = r#"# SimplePay checkout configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[timing]
# settle_ms = 400             # 0-5000, match the exit transition
# loader_fade_delay_ms = 400  # 0-5000
# loader_hide_delay_ms = 300  # 0-5000

[gesture]
# dismiss_threshold = 0.15    # fraction of viewport height, 0.01-1.0

[layout]
# compact_max_width = 480     # px

[bridge]
# debug = false

[text]
# cancel_prompt = "Are you sure you want to cancel the payment?"
"#;
