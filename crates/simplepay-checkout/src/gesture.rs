//! Drag-to-dismiss recognition for the compact layout.
//!
//! Tracks a single pointer or touch session from drag-start to drag-end.
//! Only downward movement translates the sheet; on release the drag either
//! asks to dismiss (past a fraction of the viewport height) or springs
//! back. Arming rules (layout, modal state) belong to the controller.

// =============================================================================
// TYPES
// =============================================================================

/// Pointer event as delivered by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// Mouse event; `page_y` in CSS px.
    Mouse { page_y: f64 },
    /// Touch event; the `page_y` of each active touch point, in order.
    Touch { touches: Vec<f64> },
}

impl PointerInput {
    /// Vertical position used by the gesture: the first touch point for
    /// touch events. `None` for a touch event with no active points.
    pub fn y(&self) -> Option<f64> {
        match self {
            Self::Mouse { page_y } => Some(*page_y),
            Self::Touch { touches } => touches.first().copied(),
        }
    }
}

/// An active drag, from start to the latest move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start: f64,
    pub current: f64,
}

impl DragSession {
    /// Signed movement since the drag started. Positive is downward.
    pub fn delta(&self) -> f64 {
        self.current - self.start
    }

    /// Translation applied to the sheet. Never negative.
    pub fn offset(&self) -> f64 {
        self.delta().max(0.0)
    }
}

/// What a released drag asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Moved far enough down: run the close-confirmation flow.
    Dismiss,
    /// Return the sheet to its rest position.
    SpringBack,
}

// =============================================================================
// RECOGNIZER
// =============================================================================

/// Idle or dragging; at most one session at a time.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    session: Option<DragSession>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<DragSession> {
        self.session
    }

    /// Begin a drag at `y`. Returns false (and keeps the current session)
    /// if a drag is already in progress.
    pub fn start(&mut self, y: f64) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(DragSession {
            start: y,
            current: y,
        });
        true
    }

    /// Track a move to `y`. Returns the new sheet offset, or `None` when
    /// idle.
    pub fn update(&mut self, y: f64) -> Option<f64> {
        let session = self.session.as_mut()?;
        session.current = y;
        Some(session.offset())
    }

    /// Release the drag. `threshold` is a fraction of `viewport_height`.
    /// Returns `None` when idle.
    pub fn finish(&mut self, viewport_height: f64, threshold: f64) -> Option<DragOutcome> {
        let session = self.session.take()?;
        let delta = session.delta();
        let limit = viewport_height * threshold;
        if delta > limit && delta > 0.0 {
            Some(DragOutcome::Dismiss)
        } else {
            Some(DragOutcome::SpringBack)
        }
    }

    /// Drop the session without an outcome. Returns true if one was active.
    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some()
    }
}

// =============================================================================
// TESTS
// =============================================================================
