//! Read-only view of the environment the checkout runs in.

use serde::{Deserialize, Serialize};

use crate::types::{HostFamily, LayoutMode};

/// Size of the host page viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Queried by the bridge and the modal controller instead of reading
/// process-wide globals.
pub trait EnvironmentProbe: Send + Sync {
    /// Host platform family.
    fn host_family(&self) -> HostFamily;

    /// Whether the device itself identifies as a phone or tablet.
    fn is_mobile_device(&self) -> bool;

    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Layout classification for the current viewport.
    fn layout(&self, compact_max_width: f64) -> LayoutMode {
        LayoutMode::classify(self.is_mobile_device(), self.viewport(), compact_max_width)
    }
}
