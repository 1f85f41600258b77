//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the checkout overlay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub timing: TimingConfig,
    pub gesture: GestureConfig,
    pub layout: LayoutConfig,
    pub bridge: BridgeConfig,
    pub text: TextConfig,
}

/// Delays of the overlay's scheduled steps, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after `close()` before side effects run. Matches the exit
    /// transition (valid range: 0-5000).
    pub settle_ms: u64,
    /// Wait after the content finishes loading before the loader fades.
    pub loader_fade_delay_ms: u64,
    /// Wait after the fade starts before the loader is removed.
    pub loader_hide_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 400,
            loader_fade_delay_ms: 400,
            loader_hide_delay_ms: 300,
        }
    }
}

impl TimingConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn loader_fade_delay(&self) -> Duration {
        Duration::from_millis(self.loader_fade_delay_ms)
    }

    pub fn loader_hide_delay(&self) -> Duration {
        Duration::from_millis(self.loader_hide_delay_ms)
    }
}

/// Drag-to-dismiss tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Fraction of the viewport height a downward drag must exceed to
    /// ask for dismissal (valid range: 0.01-1.0).
    pub dismiss_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dismiss_threshold: 0.15,
        }
    }
}

/// Compact-vs-full layout classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Viewports at most this wide (CSS px) use the bottom sheet.
    pub compact_max_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            compact_max_width: 480.0,
        }
    }
}

/// Native bridge options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log every call, response and registration.
    pub debug: bool,
}

/// User-facing strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Confirmation prompt shown before a user-initiated cancel.
    pub cancel_prompt: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            cancel_prompt: "Are you sure you want to cancel the payment?".into(),
        }
    }
}
