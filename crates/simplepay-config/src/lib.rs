//! SimplePay checkout configuration.
//!
//! TOML-based configuration for overlay timings, the drag-to-dismiss
//! gesture, layout classification and the native bridge. Every section
//! uses serde defaults, so partial files and a missing file both work.
//!
//! ```rust,no_run
//! use simplepay_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("settle after {:?}", config.timing.settle());
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BridgeConfig, CheckoutConfig, GestureConfig, LayoutConfig, TextConfig, TimingConfig,
};

use simplepay_common::ConfigError;

/// Load and validate config from the platform default path.
pub fn load_config() -> Result<CheckoutConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &CheckoutConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
