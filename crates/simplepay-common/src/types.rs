use serde::{Deserialize, Serialize};
use std::fmt;

use crate::environment::Viewport;

/// Which kind of hybrid-app host the page is running inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostFamily {
    /// Announces its channel with a one-time ready event.
    Android,
    /// Installs its channel after intercepting a probe navigation.
    Ios,
    /// Plain browser tab or unknown webview.
    Browser,
}

impl HostFamily {
    /// Whether a native host is expected to answer bridge traffic at all.
    pub fn is_hybrid(self) -> bool {
        matches!(self, Self::Android | Self::Ios)
    }
}

impl fmt::Display for HostFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Browser => "browser",
        };
        f.write_str(name)
    }
}

/// Presentation mode of the checkout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Bottom sheet, drag-to-dismiss enabled.
    Compact,
    /// Centered dialog.
    Full,
}

impl LayoutMode {
    /// Mobile devices always get the sheet; otherwise narrow viewports do.
    pub fn classify(mobile_device: bool, viewport: Viewport, compact_max_width: f64) -> Self {
        if mobile_device || viewport.width <= compact_max_width {
            Self::Compact
        } else {
            Self::Full
        }
    }

    pub fn is_compact(self) -> bool {
        self == Self::Compact
    }
}

/// Lifecycle of the checkout overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalState {
    Hidden,
    Opening,
    Open,
    Closing,
}

impl ModalState {
    /// Opening and Open both count as showing the overlay.
    pub fn is_showing(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}

impl fmt::Display for ModalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hidden => "hidden",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f64) -> Viewport {
        Viewport {
            width,
            height: 800.0,
        }
    }

    #[test]
    fn hybrid_families() {
        assert!(HostFamily::Android.is_hybrid());
        assert!(HostFamily::Ios.is_hybrid());
        assert!(!HostFamily::Browser.is_hybrid());
    }

    #[test]
    fn host_family_serde_lowercase() {
        let family: HostFamily = serde_json::from_str("\"ios\"").unwrap();
        assert_eq!(family, HostFamily::Ios);
        assert_eq!(HostFamily::Android.to_string(), "android");
    }

    #[test]
    fn narrow_viewport_is_compact() {
        assert_eq!(
            LayoutMode::classify(false, viewport(480.0), 480.0),
            LayoutMode::Compact
        );
        assert_eq!(
            LayoutMode::classify(false, viewport(320.0), 480.0),
            LayoutMode::Compact
        );
    }

    #[test]
    fn wide_viewport_is_full() {
        assert_eq!(
            LayoutMode::classify(false, viewport(481.0), 480.0),
            LayoutMode::Full
        );
    }

    #[test]
    fn mobile_device_is_always_compact() {
        assert_eq!(
            LayoutMode::classify(true, viewport(1024.0), 480.0),
            LayoutMode::Compact
        );
    }

    #[test]
    fn showing_states() {
        assert!(ModalState::Opening.is_showing());
        assert!(ModalState::Open.is_showing());
        assert!(!ModalState::Closing.is_showing());
        assert!(!ModalState::Hidden.is_showing());
        assert_eq!(ModalState::Closing.to_string(), "closing");
    }
}
