//! Presentation state of the overlay.
//!
//! The controller writes this; a renderer (DOM, webview, test) reads it.

use serde::Serialize;
use simplepay_common::LayoutMode;

/// Loading indicator over the embedded content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoaderState {
    Shown,
    /// Opacity transition running; still in the layout.
    Fading,
    Hidden,
}

/// Inline transform on the checkout container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ContainerTransform {
    /// Layout-defined position (no inline transform).
    Rest,
    /// Dragged down by this many px.
    Offset(f64),
    /// Translated fully below the viewport (compact exit).
    Dismissed,
}

/// Transition applied to the container's transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    /// Layout-defined enter/exit animation.
    Default,
    /// No transition, so the sheet tracks the pointer exactly.
    Suppressed,
    /// Short ease used after a released drag.
    Spring,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalView {
    pub layout: LayoutMode,
    pub overlay_visible: bool,
    pub container_visible: bool,
    pub loader: LoaderState,
    /// Source of the embedded checkout document. `None` means blank.
    pub content_src: Option<String>,
    pub transform: ContainerTransform,
    pub transition: Transition,
    /// Text selection inside the container; disabled while dragging.
    pub selectable: bool,
    /// Host page scrolling locked behind the sheet.
    pub scroll_locked: bool,
}

impl ModalView {
    pub fn new(layout: LayoutMode) -> Self {
        Self {
            layout,
            overlay_visible: false,
            container_visible: false,
            loader: LoaderState::Hidden,
            content_src: None,
            transform: ContainerTransform::Rest,
            transition: Transition::Default,
            selectable: true,
            scroll_locked: false,
        }
    }

    /// Current drag displacement of the container.
    pub fn drag_offset(&self) -> f64 {
        match self.transform {
            ContainerTransform::Offset(px) => px,
            ContainerTransform::Rest | ContainerTransform::Dismissed => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_view_is_hidden_and_blank() {
        let view = ModalView::new(LayoutMode::Full);
        assert!(!view.overlay_visible);
        assert!(!view.container_visible);
        assert_eq!(view.content_src, None);
        assert_eq!(view.drag_offset(), 0.0);
        assert!(view.selectable);
    }

    #[test]
    fn drag_offset_only_counts_drag() {
        let mut view = ModalView::new(LayoutMode::Compact);
        view.transform = ContainerTransform::Offset(42.0);
        assert_eq!(view.drag_offset(), 42.0);
        view.transform = ContainerTransform::Dismissed;
        assert_eq!(view.drag_offset(), 0.0);
    }
}
